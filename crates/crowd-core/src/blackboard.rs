use std::collections::BTreeMap;

/// Read access to shared simulation values.
///
/// Brain evaluation only ever reads through this trait; writes are returned as
/// data and committed by whoever owns the backing store.
pub trait BlackboardRead {
    fn read(&self, key: &str) -> Option<f32>;
}

impl BlackboardRead for BTreeMap<String, f32> {
    fn read(&self, key: &str) -> Option<f32> {
        self.get(key).copied()
    }
}

impl<T: BlackboardRead + ?Sized> BlackboardRead for &T {
    fn read(&self, key: &str) -> Option<f32> {
        (**self).read(key)
    }
}
