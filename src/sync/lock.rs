//! Lock strategies guarding a single state slot.
//!
//! Both strategies are reentrant for the thread inside the exclusive
//! section, so an interaction may hold the section while its operation
//! reads or transitions the same instance.

use parking_lot::{ReentrantMutex, RwLock, RwLockWriteGuard};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Proof that an exclusive section is held; the section ends on drop.
///
/// Guards are not `Send`: a section is released on the thread that entered
/// it.
#[must_use = "the exclusive section ends as soon as the guard is dropped"]
pub struct ExclusiveGuard<'a> {
    _held: Box<dyn Held + 'a>,
}

trait Held {}

impl<T> Held for T {}

impl<'a> ExclusiveGuard<'a> {
    fn new<G: 'a>(guard: G) -> Self {
        Self {
            _held: Box::new(guard),
        }
    }
}

/// Storage for one state value plus the locking discipline around it.
///
/// Implementations must make [`exclusive`](Self::exclusive) reentrant and
/// let the holding thread call [`load`](Self::load) and
/// [`store`](Self::store) without blocking on itself.
pub trait StateLock<S>: Send + Sync {
    fn new(initial: S) -> Self
    where
        Self: Sized;

    /// Reads the current state.
    fn load(&self) -> S;

    /// Replaces the current state inside an exclusive section.
    fn store(&self, state: S);

    /// Enters the exclusive section, blocking until it is available.
    fn exclusive(&self) -> ExclusiveGuard<'_>;
}

/// One reentrant mutex around every read and write.
///
/// Reads are serialized with writes and with each other.
pub struct CoarseLock<S> {
    slot: ReentrantMutex<RefCell<S>>,
}

impl<S: Clone + Send> StateLock<S> for CoarseLock<S> {
    fn new(initial: S) -> Self {
        Self {
            slot: ReentrantMutex::new(RefCell::new(initial)),
        }
    }

    fn load(&self) -> S {
        self.slot.lock().borrow().clone()
    }

    fn store(&self, state: S) {
        *self.slot.lock().borrow_mut() = state;
    }

    fn exclusive(&self) -> ExclusiveGuard<'_> {
        ExclusiveGuard::new(self.slot.lock())
    }
}

/// A read/write gate: readers share it, the exclusive section owns it.
///
/// Readers on other threads run concurrently with each other but never
/// while a writer holds the section. `parking_lot`'s eventual fairness keeps
/// writers from starving behind a stream of readers.
pub struct ReadWriteLock<S> {
    gate: RwLock<()>,
    slot: RwLock<S>,
    owner: AtomicU64,
}

const NO_OWNER: u64 = 0;

fn thread_token() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(NO_OWNER + 1);
    thread_local! {
        static TOKEN: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TOKEN.with(|token| *token)
}

struct WriteSection<'a> {
    owner: &'a AtomicU64,
    _gate: RwLockWriteGuard<'a, ()>,
}

impl Drop for WriteSection<'_> {
    fn drop(&mut self) {
        // Runs before the gate guard is dropped.
        self.owner.store(NO_OWNER, Ordering::Release);
    }
}

impl<S> ReadWriteLock<S> {
    fn held_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Acquire) == thread_token()
    }
}

impl<S: Clone + Send + Sync> StateLock<S> for ReadWriteLock<S> {
    fn new(initial: S) -> Self {
        Self {
            gate: RwLock::new(()),
            slot: RwLock::new(initial),
            owner: AtomicU64::new(NO_OWNER),
        }
    }

    fn load(&self) -> S {
        if self.held_by_current_thread() {
            return self.slot.read().clone();
        }
        let _shared = self.gate.read();
        self.slot.read().clone()
    }

    fn store(&self, state: S) {
        let _section = self.exclusive();
        *self.slot.write() = state;
    }

    fn exclusive(&self) -> ExclusiveGuard<'_> {
        if self.held_by_current_thread() {
            return ExclusiveGuard::new(());
        }
        let gate = self.gate.write();
        self.owner.store(thread_token(), Ordering::Release);
        ExclusiveGuard::new(WriteSection {
            owner: &self.owner,
            _gate: gate,
        })
    }
}
