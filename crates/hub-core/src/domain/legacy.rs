//! Backfill for post documents created before vote state existed.
//!
//! Early posts were stored with only `title`/`content`/`author` fields. This
//! normalization gives such documents empty vote sets, zero counts and an
//! empty comment list, leaving every other field untouched. Field names match
//! the legacy store's camelCase convention.

use serde_json::Value;

const LIST_FIELDS: [&str; 3] = ["upvotedBy", "downvotedBy", "comments"];
const COUNT_FIELDS: [&str; 2] = ["upvotes", "downvotes"];

/// Fill in missing or null vote-state fields on a raw post document.
///
/// Returns `true` if the document was changed. Idempotent: running it on an
/// already-normalized document is a no-op.
pub fn backfill_post_document(doc: &mut Value) -> bool {
    let Some(map) = doc.as_object_mut() else {
        return false;
    };

    let mut changed = false;

    for field in LIST_FIELDS {
        let missing = matches!(map.get(field), None | Some(Value::Null));
        if missing {
            map.insert(field.to_string(), Value::Array(Vec::new()));
            changed = true;
        }
    }

    for field in COUNT_FIELDS {
        let missing = matches!(map.get(field), None | Some(Value::Null));
        if missing {
            map.insert(field.to_string(), Value::from(0));
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fills_missing_vote_state() {
        let mut doc = json!({
            "title": "Old post",
            "content": "From before voting shipped",
            "author": "carol@x.com",
        });

        assert!(backfill_post_document(&mut doc));

        assert_eq!(doc["upvotedBy"], json!([]));
        assert_eq!(doc["downvotedBy"], json!([]));
        assert_eq!(doc["comments"], json!([]));
        assert_eq!(doc["upvotes"], json!(0));
        assert_eq!(doc["downvotes"], json!(0));
        // Untouched fields survive.
        assert_eq!(doc["title"], json!("Old post"));
        assert_eq!(doc["author"], json!("carol@x.com"));
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let mut doc = json!({"title": "Old post", "content": "body"});

        backfill_post_document(&mut doc);
        let once = doc.clone();

        assert!(!backfill_post_document(&mut doc));
        assert_eq!(doc, once);
    }

    #[test]
    fn populated_documents_are_untouched() {
        let mut doc = json!({
            "title": "Current post",
            "upvotes": 2,
            "downvotes": 1,
            "upvotedBy": ["a@x.com", "b@x.com"],
            "downvotedBy": ["c@x.com"],
            "comments": [{"id": "1", "content": "hi"}],
        });
        let before = doc.clone();

        assert!(!backfill_post_document(&mut doc));
        assert_eq!(doc, before);
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let mut doc = json!({"title": "t", "upvotedBy": null, "upvotes": null});

        assert!(backfill_post_document(&mut doc));

        assert_eq!(doc["upvotedBy"], json!([]));
        assert_eq!(doc["upvotes"], json!(0));
    }
}
