use std::borrow::Cow;

/// The `AsBytes` trait allows a type to be used as a key in a `Trie`.
///
/// Byte-like keys are borrowed as-is; integers are encoded big-endian so
/// that their key order matches their numeric order for unsigned types.
pub trait AsBytes {
    /// Returns the key bytes, borrowing where possible.
    fn as_bytes(&self) -> Cow<'_, [u8]>;

    fn as_bytes_vec(&self) -> Vec<u8> {
        self.as_bytes().into_owned()
    }
}

impl AsBytes for [u8] {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl AsBytes for Vec<u8> {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<const N: usize> AsBytes for [u8; N] {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl AsBytes for str {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(str::as_bytes(self))
    }
}

impl AsBytes for String {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_str().as_bytes())
    }
}

impl<T: AsBytes + ?Sized> AsBytes for &T {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        T::as_bytes(*self)
    }
}

impl AsBytes for u8 {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(vec![*self])
    }
}

impl AsBytes for bool {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(vec![u8::from(*self)])
    }
}

macro_rules! big_endian_key {
    ($($ty:ty),*) => {
        $(
            impl AsBytes for $ty {
                fn as_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_be_bytes().to_vec())
                }
            }
        )*
    };
}

big_endian_key!(u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_like_keys_are_borrowed() {
        assert!(matches!(AsBytes::as_bytes("abc"), Cow::Borrowed(b"abc")));
        let owned = String::from("abc");
        assert!(matches!(AsBytes::as_bytes(&owned), Cow::Borrowed(b"abc")));
        let v = vec![1u8, 2, 3];
        assert!(matches!(AsBytes::as_bytes(&v), Cow::Borrowed(&[1, 2, 3])));
        assert!(matches!(AsBytes::as_bytes(b"xy"), Cow::Borrowed(b"xy")));
    }

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(0x0102u16.as_bytes_vec(), vec![1, 2]);
        assert_eq!(1u32.as_bytes_vec(), vec![0, 0, 0, 1]);
        assert_eq!((-1i8).as_bytes_vec(), vec![0xff]);
        assert_eq!(true.as_bytes_vec(), vec![1]);
        assert_eq!(7u8.as_bytes_vec(), vec![7]);
    }

    #[test]
    fn test_unsigned_order_is_preserved() {
        let a = 255u32.as_bytes_vec();
        let b = 256u32.as_bytes_vec();
        assert!(a < b);
    }
}
