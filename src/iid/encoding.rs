//! Edge encoding and direction — the infix segment of an edge view IID.
//!
//! Grounded in the teacher's tag-byte-as-associated-constant idiom
//! (`key/mod.rs`'s `TAG_*` constants) applied to the spec's nine edge
//! encodings (spec.md GLOSSARY: "Encoding").

use std::fmt;

/// Edge kind, with direction baked into the on-disk infix byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Encoding {
    // ── Type-level edges ─────────────────────────────
    Sub,
    Owns,
    Plays,
    Relates,
    // ── Thing-level edges ────────────────────────────
    Isa,
    Has,
    Relating,
    Playing,
    /// Optimised: carries a role-instance suffix (spec.md §3, §4.4).
    RolePlayer,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }
}

impl Encoding {
    const CODE_SUB: u8 = 0;
    const CODE_OWNS: u8 = 1;
    const CODE_PLAYS: u8 = 2;
    const CODE_RELATES: u8 = 3;
    const CODE_ISA: u8 = 4;
    const CODE_HAS: u8 = 5;
    const CODE_RELATING: u8 = 6;
    const CODE_PLAYING: u8 = 7;
    const CODE_ROLE_PLAYER: u8 = 8;

    const fn code(self) -> u8 {
        match self {
            Self::Sub => Self::CODE_SUB,
            Self::Owns => Self::CODE_OWNS,
            Self::Plays => Self::CODE_PLAYS,
            Self::Relates => Self::CODE_RELATES,
            Self::Isa => Self::CODE_ISA,
            Self::Has => Self::CODE_HAS,
            Self::Relating => Self::CODE_RELATING,
            Self::Playing => Self::CODE_PLAYING,
            Self::RolePlayer => Self::CODE_ROLE_PLAYER,
        }
    }

    /// Every encoding, used by an unsorted full scan that must check each
    /// one in turn rather than narrowing to a single lookahead chain
    /// (spec.md §4.4 "unsorted full scan").
    pub const ALL: [Self; 9] = [
        Self::Sub,
        Self::Owns,
        Self::Plays,
        Self::Relates,
        Self::Isa,
        Self::Has,
        Self::Relating,
        Self::Playing,
        Self::RolePlayer,
    ];

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            Self::CODE_SUB => Self::Sub,
            Self::CODE_OWNS => Self::Owns,
            Self::CODE_PLAYS => Self::Plays,
            Self::CODE_RELATES => Self::Relates,
            Self::CODE_ISA => Self::Isa,
            Self::CODE_HAS => Self::Has,
            Self::CODE_RELATING => Self::Relating,
            Self::CODE_PLAYING => Self::Playing,
            Self::CODE_ROLE_PLAYER => Self::RolePlayer,
            _ => return None,
        })
    }

    /// One-byte infix: `encoding code << 1 | direction bit`.
    #[must_use]
    pub const fn infix(self, direction: Direction) -> u8 {
        (self.code() << 1) | direction.bit()
    }

    #[must_use]
    pub const fn from_infix(infix: u8) -> Option<(Self, Direction)> {
        let direction = if infix & 1 == 0 {
            Direction::Forward
        } else {
            Direction::Backward
        };
        match Self::from_code(infix >> 1) {
            Some(encoding) => Some((encoding, direction)),
            None => None,
        }
    }

    /// Whether this encoding is the optimised (role-player) shape, which
    /// carries a role-instance suffix on its edge view IID.
    #[must_use]
    pub const fn is_optimised(self) -> bool {
        matches!(self, Self::RolePlayer)
    }

    /// Lookahead chain length used by buffered writers (spec.md §4.4): the
    /// number of tail components a writer must record when bucketing an
    /// edge view under its infix. Base edges record `(adjacent prefix,
    /// adjacent type)`; the optimised `RolePlayer` edge additionally
    /// prepends the role type, for a chain of three.
    #[must_use]
    pub const fn lookahead_len(self) -> usize {
        if self.is_optimised() { 3 } else { 2 }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sub => "sub",
            Self::Owns => "owns",
            Self::Plays => "plays",
            Self::Relates => "relates",
            Self::Isa => "isa",
            Self::Has => "has",
            Self::Relating => "relating",
            Self::Playing => "playing",
            Self::RolePlayer => "role_player",
        };
        write!(f, "{label}")
    }
}
