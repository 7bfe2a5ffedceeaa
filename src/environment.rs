//! Injected dependency bag passed into every reduction and effect.
//!
//! Mostly immutable: services are cheap handles over the shared store.
//! The one mutable member, the dice roller, is explicitly single-writer
//! behind its own lock. Tests swap in seeded/deterministic
//! implementations so any action log replays to the same final state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::campaign::CampaignBrowser;
use crate::compendium::Compendium;
use crate::storage::{InMemoryStore, KeyValueStore};

/// Source of fresh entity identifiers.
pub trait IdSource: Send + Sync {
    fn next(&self) -> Uuid;
}

/// Production ids: random v4.
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic monotonic ids for tests and replay.
#[derive(Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl IdSource for SequentialIds {
    fn next(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(n as u128)
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Fixed instant for deterministic tests.
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Seedable die roller.
///
/// Single writer: the generator is only advanced through [`roll`],
/// which takes the lock for the duration of one roll.
///
/// [`roll`]: DiceRoller::roll
#[derive(Clone)]
pub struct DiceRoller {
    rng: Arc<Mutex<StdRng>>,
}

impl DiceRoller {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Roll one die with the given number of sides.
    pub fn roll(&self, sides: u32) -> i32 {
        self.rng.lock().gen_range(1..=sides as i32)
    }
}

/// Dependency context for reducers and effects.
#[derive(Clone)]
pub struct Environment {
    pub store: Arc<dyn KeyValueStore>,
    pub campaign_browser: CampaignBrowser,
    pub compendium: Compendium,
    pub dice: DiceRoller,
    pub ids: Arc<dyn IdSource>,
    pub clock: Arc<dyn Clock>,
}

impl Environment {
    /// Production wiring over the given store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            campaign_browser: CampaignBrowser::new(Arc::clone(&store)),
            compendium: Compendium::new(Arc::clone(&store)),
            dice: DiceRoller::from_entropy(),
            ids: Arc::new(RandomIds),
            clock: Arc::new(SystemClock),
            store,
        }
    }

    /// Fully deterministic wiring: in-memory store, seeded dice,
    /// sequential ids, fixed clock.
    pub fn deterministic(seed: u64) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self {
            campaign_browser: CampaignBrowser::new(Arc::clone(&store)),
            compendium: Compendium::new(Arc::clone(&store)),
            dice: DiceRoller::seeded(seed),
            ids: Arc::new(SequentialIds::default()),
            clock: Arc::new(FixedClock(UNIX_EPOCH + Duration::from_secs(1_600_000_000))),
            store,
        }
    }

    pub fn generate_id(&self) -> Uuid {
        self.ids.next()
    }
}
