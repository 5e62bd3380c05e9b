pub mod mutex;
pub mod os;

pub use mutex::{LockError, Mutex, MutexGuard, OsMutex, RawMutex, RtosRawMutex};
