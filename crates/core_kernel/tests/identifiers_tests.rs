//! Unit tests for the Identifiers module
//!
//! Covers creation, parsing, conversion and display formatting of the
//! intake identifiers.

use core_kernel::{DraftId, DocumentId, SessionId};
use uuid::Uuid;

mod document_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = DocumentId::new();
        let id2 = DocumentId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = DocumentId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = DocumentId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = DocumentId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(DocumentId::prefix(), "DOC");
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("DOC-not-a-uuid".parse::<DocumentId>().is_err());
    }
}

mod draft_and_session_id_tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(DraftId::new().to_string().starts_with("DRF-"));
        assert!(SessionId::new().to_string().starts_with("SES-"));
    }

    #[test]
    fn test_round_trip_through_display() {
        let original = SessionId::new_v7();
        let parsed: SessionId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = DraftId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod parsing_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_prefix_is_optional_when_parsing(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid::from_bytes(bytes);
            let bare: DraftId = uuid.to_string().parse().unwrap();
            let prefixed: DraftId = format!("DRF-{}", uuid).parse().unwrap();
            prop_assert_eq!(bare, prefixed);
            prop_assert_eq!(*bare.as_uuid(), uuid);
        }
    }
}
