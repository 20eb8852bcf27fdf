#![allow(unused_macros)]

/// Helper macro for reading locked items, propagating a poisoned lock as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let slots = read_lock!(self.slots);
///  println!("{}", slots.len());
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for writing to locked items, propagating a poisoned lock as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut slots = write_lock!(self.slots);
///  slots[0] = ModuleSlot::Unloaded;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)?
    };
}
