//! Per-object locks and their scoped guards.
//!
//! Every object owns exactly one [`ObjectMutex`], which also owns the
//! object's mutable state. The only way in is [`ObjectMutex::lock`], which
//! returns an [`ObjectLock`] that releases on every exit path.
//!
//! Release builds use a bare `parking_lot` mutex. Debug builds additionally
//! keep a process-wide owner table so that:
//! - [`owns_lock`] can answer "does the calling thread hold this object",
//! - locking an object again on the thread that already holds it panics
//!   with a diagnostic instead of deadlocking the thread.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};
use vigil_types::ObjectId;

/// The lock of one object, owning the state it protects.
///
/// Obtained only through [`ObjectBase`](crate::ObjectBase). A free-standing
/// lock would carry an id that belongs to no object:
///
/// ```compile_fail
/// use vigil_base::{ObjectId, ObjectMutex};
///
/// let _ = ObjectMutex::new(ObjectId::new(), ());
/// ```
///
/// ```compile_fail
/// use vigil_base::ObjectMutex;
///
/// let _: ObjectMutex<()> = Default::default();
/// ```
pub struct ObjectMutex<S> {
    id: ObjectId,
    inner: Mutex<S>,
}

impl<S> ObjectMutex<S> {
    /// Creates the lock for the object with the given id.
    ///
    /// Only [`ObjectBase`](crate::ObjectBase) creates locks, so every lock
    /// is keyed by the id of the object that embeds it.
    pub(crate) fn new(id: ObjectId, state: S) -> Self {
        Self {
            id,
            inner: Mutex::new(state),
        }
    }

    /// Returns the id of the object this lock belongs to.
    #[must_use]
    pub const fn object_id(&self) -> ObjectId {
        self.id
    }

    /// Blocks until the lock is acquired.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the calling thread already holds this lock.
    pub fn lock(&self) -> ObjectLock<'_, S> {
        #[cfg(debug_assertions)]
        owners::check_reentry(self.id);

        let guard = self.inner.lock();

        #[cfg(debug_assertions)]
        owners::record(self.id);

        ObjectLock { id: self.id, guard }
    }

    /// Returns true if the calling thread holds this lock.
    ///
    /// Always false in release builds.
    #[must_use]
    pub fn owns_lock(&self) -> bool {
        owns_lock(self.id)
    }

    /// Mutable access without locking, for an object nobody else can see yet.
    pub fn get_mut(&mut self) -> &mut S {
        self.inner.get_mut()
    }

    /// Consumes the lock, returning the state.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S> fmt::Debug for ObjectMutex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMutex")
            .field("object_id", &self.id)
            .field("locked", &self.inner.is_locked())
            .finish()
    }
}

/// Scoped guard over an object's lock.
pub struct ObjectLock<'a, S> {
    id: ObjectId,
    guard: MutexGuard<'a, S>,
}

impl<S> ObjectLock<'_, S> {
    /// Returns the id of the locked object.
    #[must_use]
    pub const fn object_id(&self) -> ObjectId {
        self.id
    }
}

impl<S> Deref for ObjectLock<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.guard
    }
}

impl<S> DerefMut for ObjectLock<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.guard
    }
}

impl<S> Drop for ObjectLock<'_, S> {
    fn drop(&mut self) {
        // Runs before `guard` releases the mutex.
        #[cfg(debug_assertions)]
        owners::clear(self.id);
    }
}

impl<S: fmt::Debug> fmt::Debug for ObjectLock<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectLock")
            .field("object_id", &self.id)
            .field("state", &*self.guard)
            .finish()
    }
}

/// Locks two different objects in canonical order.
///
/// The lock with the smaller [`ObjectId`] is always taken first, so two
/// threads calling this for the same pair in opposite argument order cannot
/// deadlock each other. Guards are returned in argument order.
///
/// # Panics
///
/// Panics if both locks belong to the same object.
pub fn lock_pair<'a, 'b, A, B>(
    a: &'a ObjectMutex<A>,
    b: &'b ObjectMutex<B>,
) -> (ObjectLock<'a, A>, ObjectLock<'b, B>) {
    assert_ne!(a.id, b.id, "lock_pair called twice with object {}", a.id);
    if a.id < b.id {
        let first = a.lock();
        let second = b.lock();
        (first, second)
    } else {
        let second = b.lock();
        let first = a.lock();
        (first, second)
    }
}

/// Returns true if the calling thread holds the lock of object `id`.
///
/// Lock ownership is only tracked in debug builds; release builds always
/// answer false.
#[must_use]
pub fn owns_lock(id: ObjectId) -> bool {
    #[cfg(debug_assertions)]
    {
        owners::is_held_by_current_thread(id)
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = id;
        false
    }
}

/// Ids of all objects whose lock the calling thread holds, in lock order.
///
/// Empty in release builds.
#[must_use]
pub fn locks_held_by_current_thread() -> Vec<ObjectId> {
    #[cfg(debug_assertions)]
    {
        owners::held_by_current_thread()
    }
    #[cfg(not(debug_assertions))]
    {
        Vec::new()
    }
}

#[cfg(debug_assertions)]
mod owners {
    use std::collections::HashMap;
    use std::sync::LazyLock;
    use std::thread::{self, ThreadId};

    use parking_lot::Mutex;
    use vigil_types::ObjectId;

    static LOCK_OWNERS: LazyLock<Mutex<HashMap<ObjectId, ThreadId>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    pub(super) fn check_reentry(id: ObjectId) {
        let reentered = LOCK_OWNERS.lock().get(&id) == Some(&thread::current().id());
        if reentered {
            panic!("object {id} is already locked by the current thread");
        }
    }

    pub(super) fn record(id: ObjectId) {
        let previous = LOCK_OWNERS.lock().insert(id, thread::current().id());
        debug_assert!(previous.is_none(), "object {id} locked by two threads");
    }

    pub(super) fn clear(id: ObjectId) {
        LOCK_OWNERS.lock().remove(&id);
    }

    pub(super) fn is_held_by_current_thread(id: ObjectId) -> bool {
        LOCK_OWNERS.lock().get(&id) == Some(&thread::current().id())
    }

    pub(super) fn held_by_current_thread() -> Vec<ObjectId> {
        let current = thread::current().id();
        let mut held: Vec<ObjectId> = LOCK_OWNERS
            .lock()
            .iter()
            .filter(|(_, owner)| **owner == current)
            .map(|(id, _)| *id)
            .collect();
        held.sort();
        held
    }
}
