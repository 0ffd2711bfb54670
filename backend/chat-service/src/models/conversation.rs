use uuid::Uuid;

use crate::error::AppError;

const DIRECT_MARKER: &str = "DIRECT";
const GROUP_MARKER: &str = "GROUP";
const SEPARATOR: char = '#';

/// Canonical identity of a message stream. Direct chats key on both
/// participants in sorted order so either side derives the same id; group
/// chats key on the group id, which is already globally unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Direct { a: String, b: String },
    Group(Uuid),
}

/// Identifiers are normalized once, at the boundary. Every store read and
/// write uses the lowercased form.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Chat id for a two-party conversation. Order-independent:
/// `direct_chat_id(a, b) == direct_chat_id(b, a)`.
pub fn direct_chat_id(a: &str, b: &str) -> String {
    let a = normalize_id(a);
    let b = normalize_id(b);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{DIRECT_MARKER}{SEPARATOR}{lo}{SEPARATOR}{hi}")
}

/// Chat id for a group conversation
pub fn group_chat_id(group_id: Uuid) -> String {
    format!("{GROUP_MARKER}{SEPARATOR}{group_id}")
}

/// Parse a client-supplied chat id back into its target. Rejects ids that do
/// not carry a known marker so the send and query paths only ever see keys
/// this module produced.
pub fn parse_chat_id(chat_id: &str) -> Result<ChatTarget, AppError> {
    if let Some(rest) = chat_id.strip_prefix(&format!("{DIRECT_MARKER}{SEPARATOR}")) {
        let mut parts = rest.splitn(2, SEPARATOR);
        let a = parts.next().unwrap_or_default();
        let b = parts.next().unwrap_or_default();
        if a.is_empty() || b.is_empty() {
            return Err(AppError::Validation("malformed direct chat id".into()));
        }
        return Ok(ChatTarget::Direct {
            a: a.to_string(),
            b: b.to_string(),
        });
    }
    if let Some(rest) = chat_id.strip_prefix(&format!("{GROUP_MARKER}{SEPARATOR}")) {
        let id = Uuid::parse_str(rest)
            .map_err(|_| AppError::Validation("malformed group chat id".into()))?;
        return Ok(ChatTarget::Group(id));
    }
    Err(AppError::Validation("unrecognized chat id".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_independent() {
        let ab = direct_chat_id("alice@example.com", "bob@example.com");
        let ba = direct_chat_id("bob@example.com", "alice@example.com");
        assert_eq!(ab, ba);
        assert_eq!(ab, "DIRECT#alice@example.com#bob@example.com");
    }

    #[test]
    fn direct_key_normalizes_case() {
        assert_eq!(
            direct_chat_id("Alice@Example.COM", "bob@example.com"),
            direct_chat_id("alice@example.com", "BOB@example.com"),
        );
    }

    #[test]
    fn direct_and_group_markers_are_disjoint() {
        let gid = Uuid::new_v4();
        let group = group_chat_id(gid);
        assert!(group.starts_with("GROUP#"));
        assert!(matches!(parse_chat_id(&group), Ok(ChatTarget::Group(g)) if g == gid));
        assert!(matches!(
            parse_chat_id("DIRECT#a@x.com#b@x.com"),
            Ok(ChatTarget::Direct { .. })
        ));
    }

    #[test]
    fn parse_rejects_unmarked_and_malformed_ids() {
        assert!(parse_chat_id("alice@example.com").is_err());
        assert!(parse_chat_id("DIRECT#only-one").is_err());
        assert!(parse_chat_id("GROUP#not-a-uuid").is_err());
        assert!(parse_chat_id("").is_err());
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_id("  Alice@Example.com "), "alice@example.com");
    }
}
