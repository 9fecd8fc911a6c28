/// Ceiling division for the signed integers used in cost computations.
pub(crate) trait NumExt {
    /// Division rounding towards positive infinity.
    fn div_ceil(self, other: Self) -> Self;
}

macro_rules! impl_num_ext {
    ($type:ty) => {
        impl NumExt for $type {
            fn div_ceil(self, other: Self) -> Self {
                let quotient = self / other;
                let remainder = self % other;

                if (remainder > 0 && other > 0) || (remainder < 0 && other < 0) {
                    quotient + 1
                } else {
                    quotient
                }
            }
        }
    };
}

impl_num_ext!(i64);
impl_num_ext!(i128);

#[cfg(test)]
mod tests {
    use super::NumExt;

    #[test]
    fn rounding_directions() {
        assert_eq!(3, NumExt::div_ceil(7_i64, 3));
        assert_eq!(-2, NumExt::div_ceil(-7_i64, 3));
        assert_eq!(4, NumExt::div_ceil(8_i128, 2));
    }
}
