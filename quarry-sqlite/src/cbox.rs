use std::ops::{Deref, DerefMut};

pub(crate) trait NullCheck {
    fn is_null(&self) -> bool;
}

impl<T> NullCheck for *mut T {
    fn is_null(&self) -> bool {
        (*self as *const T).is_null()
    }
}

/// Owns a pointer handed out by the C library, releasing it with `dealloc` unless null.
#[derive(Debug)]
pub(crate) struct CBox<T: NullCheck> {
    pub(crate) ptr: T,
    dealloc: fn(T),
}

impl<T: NullCheck> CBox<T> {
    pub fn new(ptr: T, dealloc: fn(T)) -> Self {
        Self { ptr, dealloc }
    }
}

impl<T: NullCheck> Drop for CBox<T> {
    fn drop(&mut self) {
        if !self.is_null() {
            unsafe {
                (self.dealloc)(std::ptr::read(&self.ptr as *const T));
            }
        }
    }
}

impl<T: NullCheck> Deref for CBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<T: NullCheck> DerefMut for CBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptr
    }
}

unsafe impl<T: NullCheck> Send for CBox<T> {}
unsafe impl<T: NullCheck> Sync for CBox<T> {}

#[cfg(test)]
mod tests {
    use super::CBox;
    use std::{
        ptr,
        sync::atomic::{AtomicBool, Ordering},
    };

    static RELEASED: AtomicBool = AtomicBool::new(false);

    #[test]
    fn releases_only_non_null() {
        let mut value = 123;
        {
            let cbox = CBox::new(ptr::null_mut::<i32>(), |_| RELEASED.store(true, Ordering::SeqCst));
            assert!(cbox.ptr.is_null());
        }
        assert!(!RELEASED.load(Ordering::SeqCst));
        {
            let cbox = CBox::new(&mut value as *mut i32, |_| RELEASED.store(true, Ordering::SeqCst));
            assert_eq!(unsafe { **cbox }, 123);
        }
        assert!(RELEASED.load(Ordering::SeqCst));
    }
}
