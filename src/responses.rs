//! Canned replies and the random source used to pick them.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::PoolError;

pub const DEFAULT_RESPONSES: [&str; 15] = [
    "That's an interesting question! Let me think about that for a moment.",
    "I understand what you're asking. Here's my perspective on that topic.",
    "Great question! I'd be happy to help you with that.",
    "That's a thoughtful inquiry. Let me provide you with some insights.",
    "I appreciate you asking about that. Here's what I can tell you.",
    "That's something I can definitely help you with. Let me explain.",
    "Interesting point! I have some thoughts on that subject.",
    "I'm glad you brought that up. It's an important topic to discuss.",
    "That's a complex question, but I'll do my best to provide a helpful answer.",
    "I see what you're getting at. Let me share some relevant information.",
    "That's a valid concern. Here's how I would approach that situation.",
    "Good thinking! That's exactly the kind of question that leads to great discussions.",
    "I'm here to help! Let me break that down for you step by step.",
    "That's a fascinating topic. I'd love to explore that with you further.",
    "You've touched on something really important there. Here's my take on it.",
];

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

pub struct ThreadRandom(StdRng);

impl ThreadRandom {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Out-of-range
/// values are clamped into `[0, 1)`.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResponsePool {
    entries: Vec<String>,
}

impl ResponsePool {
    pub fn new<I, S>(entries: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn pick(&self, random: &mut dyn RandomSource) -> &str {
        let index = (random.next_unit() * self.entries.len() as f64) as usize;
        &self.entries[index.min(self.entries.len() - 1)]
    }

    pub fn contains(&self, content: &str) -> bool {
        self.entries.iter().any(|entry| entry == content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponsePool {
    fn default() -> Self {
        Self {
            entries: DEFAULT_RESPONSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
