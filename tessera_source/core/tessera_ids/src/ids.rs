//! Typed identifiers for sessions, scenes and game objects.
//! All IDs use u64 = index (low 32 bits) | generation (high 32 bits). Index 0 = nil.
//! IDs are handed out by an `IdSequence`; they are lookup keys only and never own anything.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};

/// Defines an identifier newtype (SessionID, SceneID, ObjectID).
macro_rules! define_id {
    ($type_name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $type_name(pub u64);

        impl $type_name {
            #[inline]
            pub const fn nil() -> Self {
                Self(0)
            }

            #[inline]
            pub const fn index(self) -> u32 {
                (self.0 & 0xFFFF_FFFF) as u32
            }

            #[inline]
            pub const fn generation(self) -> u32 {
                (self.0 >> 32) as u32
            }

            #[inline]
            pub const fn from_parts(index: u32, generation: u32) -> Self {
                Self((index as u64) | ((generation as u64) << 32))
            }

            #[inline]
            pub const fn is_nil(self) -> bool {
                self.0 == 0
            }
        }

        impl Default for $type_name {
            fn default() -> Self {
                Self::nil()
            }
        }

        impl fmt::Debug for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($type_name), "({}:{})"),
                    self.index(),
                    self.generation()
                )
            }
        }

        impl fmt::Display for $type_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", self.index(), self.generation())
            }
        }
    };
}

define_id!(
    SessionID,
    "Session ID: one per GameSession. Scenes point back at their session with it."
);
define_id!(
    SceneID,
    "Scene ID: one per loaded Scene. Game objects point back at their scene with it."
);
define_id!(
    ObjectID,
    "Object ID: allocated per scene while the object tree is built."
);

/// Monotonic index allocator. Index 0 is reserved for nil, so the first ID is 1.
///
/// The generation half of the produced IDs is fixed per sequence; a fresh
/// sequence with a bumped generation keeps IDs from a discarded scene from
/// matching objects of the next one.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU32,
    generation: u32,
}

impl IdSequence {
    pub const fn new() -> Self {
        Self::with_generation(0)
    }

    pub const fn with_generation(generation: u32) -> Self {
        Self {
            next: AtomicU32::new(1),
            generation,
        }
    }

    #[inline]
    fn next_parts(&self) -> (u32, u32) {
        (self.next.fetch_add(1, Ordering::Relaxed), self.generation)
    }

    pub fn next_session(&self) -> SessionID {
        let (index, generation) = self.next_parts();
        SessionID::from_parts(index, generation)
    }

    pub fn next_scene(&self) -> SceneID {
        let (index, generation) = self.next_parts();
        SceneID::from_parts(index, generation)
    }

    pub fn next_object(&self) -> ObjectID {
        let (index, generation) = self.next_parts();
        ObjectID::from_parts(index, generation)
    }

    /// Number of IDs handed out so far.
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

static SESSIONS: IdSequence = IdSequence::new();
static SCENES: IdSequence = IdSequence::new();

/// Process-wide session ID. Sessions are independent, so the counter is the only shared state.
pub fn next_session_id() -> SessionID {
    SESSIONS.next_session()
}

/// Process-wide scene ID, unique across every session in the process.
pub fn next_scene_id() -> SceneID {
    SCENES.next_scene()
}
