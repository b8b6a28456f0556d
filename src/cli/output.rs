//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{Secret, SecretType};
use crate::secrets::{presenter, FileInfo};

/// Print data as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a horizontal separator line
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    println!("{}", header.trim());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    print_separator(total_width.saturating_sub(1));
}

/// One listing row: id, type, metadata column and rendered value.
///
/// Binary rows show the restorable file name in place of the raw metadata.
pub fn secret_row(secret: &Secret) -> (String, String, String, String) {
    let metadata = if secret.secret_type == SecretType::ByteSlice.as_str() {
        FileInfo::parse(&secret.metadata)
            .map(|info| info.file_name())
            .unwrap_or_else(|| secret.metadata.clone())
    } else {
        secret.metadata.clone()
    };

    let value = presenter::render_stored(secret).replace('\n', " ");
    (secret.id.to_string(), secret.secret_type.clone(), metadata, value)
}

const COLUMNS: [(&str, usize); 4] = [("ID", 6), ("TYPE", 11), ("METADATA", 24), ("VALUE", 40)];

/// Print secrets as a table
pub fn print_secrets_table(secrets: &[Secret]) {
    if secrets.is_empty() {
        println!("No secrets stored");
        return;
    }

    print_table_header(&COLUMNS);
    for secret in secrets {
        let (id, secret_type, metadata, value) = secret_row(secret);
        println!(
            "{:<6} {:<11} {:<24} {}",
            id,
            secret_type,
            truncate(&metadata, 24),
            truncate(&value, 40)
        );
    }
    println!();
}

/// Print one secret with its full rendered value
pub fn print_secret(secret: &Secret) {
    let (id, secret_type, metadata, _) = secret_row(secret);
    println!("ID:       {}", id);
    println!("Type:     {}", secret_type);
    println!("Metadata: {}", metadata);
    println!("{}", presenter::render_stored(secret));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, SecretId};

    fn secret(secret_type: &str, value: &[u8], metadata: &str) -> Secret {
        Secret {
            id: SecretId::new(4),
            owner_id: AccountId::new(1),
            value: value.to_vec(),
            secret_type: secret_type.into(),
            metadata: metadata.into(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 5), "hi");
        assert_eq!(truncate("hello", 3), "...");
    }

    #[test]
    fn binary_rows_show_file_name() {
        let row = secret_row(&secret("ByteSlice", b"aGk=", "report|pdf|Quarterly report"));
        assert_eq!(row.2, "report.pdf");
        assert_eq!(row.3, "Quarterly report");
    }

    #[test]
    fn structured_rows_show_metadata_and_value() {
        let row = secret_row(&secret("KeyValue", br#"{"Key":"k","Value":"v"}"#, "creds"));
        assert_eq!(row, ("4".into(), "KeyValue".into(), "creds".into(), "Key: k, Value: v".into()));
    }

    #[test]
    fn undecodable_rows_fall_back_to_placeholder() {
        let row = secret_row(&secret("Mystery", b"??", "x"));
        assert_eq!(row.3, presenter::UNKNOWN_PLACEHOLDER);
    }
}
