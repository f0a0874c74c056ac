//! Client-side identifier generation for new notes.

use uuid::Uuid;

use crate::models::NoteId;

/// Produces a globally unique identifier per call.
pub trait IdGenerator {
    fn generate(&mut self) -> NoteId;
}

/// UUID v7 generator (time-sortable, so ids also sort by creation).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&mut self) -> NoteId {
        NoteId::new(Uuid::now_v7().to_string())
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> NoteId,
{
    fn generate(&mut self) -> NoteId {
        self()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let mut ids = UuidGenerator;
        let generated: HashSet<_> = (0..256).map(|_| ids.generate()).collect();
        assert_eq!(generated.len(), 256);
    }

    #[test]
    fn closures_generate_ids() {
        let mut next = 0;
        let mut ids = move || {
            next += 1;
            NoteId::new(format!("id-{next}"))
        };
        assert_eq!(IdGenerator::generate(&mut ids).as_str(), "id-1");
        assert_eq!(IdGenerator::generate(&mut ids).as_str(), "id-2");
    }
}
