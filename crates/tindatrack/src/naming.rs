/// Export file name: `<AppName>_Backup_<label>_<epochMillis>.json`.
///
/// Whitespace runs in the label become `_`; anything outside ASCII
/// letters, digits, `_` and `-` is dropped.
pub fn document_name(app_name: &str, label: &str, epoch_millis: i64) -> String {
    let mut label = sanitize(label);
    if label.is_empty() {
        label.push_str("Untitled");
    }
    format!("{}_Backup_{}_{}.json", sanitize(app_name), label, epoch_millis)
}

fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(
            document_name("TindaTrack", "Automatic Daily Backup", 1700000000000),
            "TindaTrack_Backup_Automatic_Daily_Backup_1700000000000.json"
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            document_name("TindaTrack", "  end \t of   day ", 1),
            "TindaTrack_Backup_end_of_day_1.json"
        );
    }

    #[test]
    fn test_unsafe_characters_dropped() {
        assert_eq!(
            document_name("TindaTrack", "../../etc/passwd?*", 5),
            "TindaTrack_Backup_etcpasswd_5.json"
        );
    }

    #[test]
    fn test_label_with_nothing_safe_left() {
        assert_eq!(
            document_name("TindaTrack", "***", 9),
            "TindaTrack_Backup_Untitled_9.json"
        );
    }
}
