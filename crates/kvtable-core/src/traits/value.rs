///
/// IndexValue
///
/// Text rendering of a field value for use inside an index key.
/// `None` means the field is absent and gets no index entry; an empty string
/// is a present value and is indexed.
///

pub trait IndexValue {
    fn to_index_text(&self) -> Option<String>;
}

impl IndexValue for String {
    fn to_index_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl IndexValue for str {
    fn to_index_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IndexValue for bool {
    fn to_index_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IndexValue for char {
    fn to_index_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T: IndexValue + ?Sized> IndexValue for &T {
    fn to_index_text(&self) -> Option<String> {
        (**self).to_index_text()
    }
}

impl<T: IndexValue> IndexValue for Option<T> {
    fn to_index_text(&self) -> Option<String> {
        self.as_ref().and_then(IndexValue::to_index_text)
    }
}

impl<T: IndexValue + ?Sized> IndexValue for Box<T> {
    fn to_index_text(&self) -> Option<String> {
        (**self).to_index_text()
    }
}

#[macro_export]
macro_rules! impl_index_value_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::traits::IndexValue for $ty {
                fn to_index_text(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_index_value_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::IndexValue;

    #[test]
    fn empty_string_is_present() {
        assert_eq!(String::new().to_index_text(), Some(String::new()));
    }

    #[test]
    fn none_is_absent() {
        let value: Option<u32> = None;
        assert_eq!(value.to_index_text(), None);
        assert_eq!(Some(7u32).to_index_text(), Some("7".to_string()));
    }

    #[test]
    fn numbers_render_in_decimal() {
        assert_eq!((-12i64).to_index_text().as_deref(), Some("-12"));
        assert_eq!(true.to_index_text().as_deref(), Some("true"));
    }
}
