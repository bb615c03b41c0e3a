macro_rules! serde_invalid_value {
    ($typ:ident, $unexpected:expr, $expected:expr) => {{
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Other(concat!("[", stringify!($typ), "] ", $unexpected)),
            &$expected,
        )
    }};
}

macro_rules! seq_next_element {
    ($seq:ident, $typ:ident, $missing_elem:literal) => {{
        $seq.next_element()?.ok_or_else(|| {
            serde_invalid_value!(
                $typ,
                concat!($missing_elem, " is missing"),
                concat!("a valid DER-encoded ", stringify!($typ))
            )
        })?
    }};
    ($seq:ident, $subtype:ty, $typ:ident, $missing_elem:literal) => {{
        $seq.next_element::<$subtype>()?.ok_or_else(|| {
            serde_invalid_value!(
                $typ,
                concat!($missing_elem, " is missing"),
                concat!("a valid DER-encoded ", stringify!($typ))
            )
        })?
    }};
}
