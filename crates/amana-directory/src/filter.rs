//! Escaping for values interpolated into LDAP filters and DNs.
//!
//! Usernames come from login requests and are attacker-controlled; they are
//! escaped before being placed into a search filter (RFC 4515) or a bind DN
//! (RFC 4514).

/// Escape special characters in an LDAP filter value (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Escape special characters in a DN attribute value (RFC 4514).
///
/// DN escaping differs from filter escaping: `, + " \ < > ; =` always take
/// a backslash prefix, NUL is hex-escaped, a space is escaped only at the
/// start or end, and `#` only at the start.
#[must_use]
pub fn escape_dn_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let char_count = value.chars().count();
    let mut result = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        let is_first = i == 0;
        let is_last = i == char_count - 1;

        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                result.push('\\');
                result.push(ch);
            }
            '\0' => {
                result.push_str("\\00");
            }
            ' ' if is_first || is_last => {
                result.push_str("\\20");
            }
            '#' if is_first => {
                result.push_str("\\23");
            }
            _ => {
                result.push(ch);
            }
        }
    }

    result
}
