pub mod ids;

pub use ids::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_nil() {
        let nil = ObjectID::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.index(), 0);
        assert_eq!(nil.generation(), 0);
    }

    #[test]
    fn object_id_parts() {
        let id = ObjectID::from_parts(5, 2);
        assert_eq!(id.index(), 5);
        assert_eq!(id.generation(), 2);
        assert!(!id.is_nil());
        assert_eq!(id.to_string(), "5:2");
    }

    #[test]
    fn sequence_never_hands_out_nil() {
        let seq = IdSequence::new();
        let first = seq.next_object();
        let second = seq.next_object();
        assert!(!first.is_nil());
        assert_eq!(first.index(), 1);
        assert_eq!(second.index(), 2);
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn sequence_generation_separates_ids() {
        let old = IdSequence::with_generation(1);
        let new = IdSequence::with_generation(2);
        assert_ne!(old.next_object(), new.next_object());
    }

    #[test]
    fn process_wide_ids_are_unique() {
        let a = next_scene_id();
        let b = next_scene_id();
        assert_ne!(a, b);
        assert_ne!(next_session_id(), next_session_id());
    }
}
