use std::{fmt, ops, str};

/// Represents a Universally Unique IDentifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates a UUID byte array from UUIDv1 field values: the 60-bit timestamp in 100-nanosecond
    /// ticks since 1582-10-15, the 14-bit clock sequence, and the 48-bit node identifier.
    ///
    /// # Panics
    ///
    /// Panics if any field value exceeds its bit width.
    pub const fn from_fields_v1(ticks: u64, clock_seq: u16, node: u64) -> Self {
        if ticks >= 1 << 60 || clock_seq >= 1 << 14 || node >= 1 << 48 {
            panic!("invalid field value");
        }

        Self([
            (ticks >> 24) as u8,
            (ticks >> 16) as u8,
            (ticks >> 8) as u8,
            ticks as u8,
            (ticks >> 40) as u8,
            (ticks >> 32) as u8,
            0x10 | ((ticks >> 56) as u8 & 0x0f),
            (ticks >> 48) as u8,
            0x80 | ((clock_seq >> 8) as u8 & 0x3f),
            clock_seq as u8,
            (node >> 40) as u8,
            (node >> 32) as u8,
            (node >> 24) as u8,
            (node >> 16) as u8,
            (node >> 8) as u8,
            node as u8,
        ])
    }

    /// Returns the version number encoded in the high nibble of the seventh byte.
    pub const fn version(&self) -> u8 {
        self.0[6] >> 4
    }

    /// Returns the 60-bit timestamp field as 100-nanosecond ticks since 1582-10-15.
    pub const fn timestamp_ticks(&self) -> u64 {
        ((self.0[6] & 0x0f) as u64) << 56
            | (self.0[7] as u64) << 48
            | (self.0[4] as u64) << 40
            | (self.0[5] as u64) << 32
            | (self.0[0] as u64) << 24
            | (self.0[1] as u64) << 16
            | (self.0[2] as u64) << 8
            | self.0[3] as u64
    }

    /// Returns the 14-bit clock sequence field.
    pub const fn clock_seq(&self) -> u16 {
        ((self.0[8] & 0x3f) as u16) << 8 | self.0[9] as u16
    }

    /// Returns the 48-bit node identifier field.
    pub const fn node_id(&self) -> u64 {
        (self.0[10] as u64) << 40
            | (self.0[11] as u64) << 32
            | (self.0[12] as u64) << 24
            | (self.0[13] as u64) << 16
            | (self.0[14] as u64) << 8
            | self.0[15] as u64
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid1::Uuid;
    ///
    /// let x = "f3b4958c-52a1-11e7-802a-010203040506".parse::<Uuid>()?;
    /// assert_eq!(&x.encode() as &str, "f3b4958c-52a1-11e7-802a-010203040506");
    /// # Ok::<(), uuid1::ParseError>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        let mut buffer = [0u8; 36];
        write_hyphenated(&self.0, &mut buffer);
        Encoded(buffer)
    }

    /// Returns the 32-digit hexadecimal string representation without separators.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid1::Uuid;
    ///
    /// let x = "f3b4958c-52a1-11e7-802a-010203040506".parse::<Uuid>()?;
    /// assert_eq!(&x.encode_compact() as &str, "f3b4958c52a111e7802a010203040506");
    /// # Ok::<(), uuid1::ParseError>(())
    /// ```
    pub fn encode_compact(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut buffer = [0u8; 32];
        let mut buf_iter = buffer.iter_mut();
        for e in self.0 {
            *buf_iter.next().unwrap() = DIGITS[(e >> 4) as usize];
            *buf_iter.next().unwrap() = DIGITS[(e & 15) as usize];
        }
        debug_assert!(buffer.is_ascii());
        Encoded(buffer)
    }

    /// Returns the URN string representation: `urn:uuid:` followed by the 8-4-4-4-12 form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid1::Uuid;
    ///
    /// let x = "f3b4958c-52a1-11e7-802a-010203040506".parse::<Uuid>()?;
    /// assert_eq!(
    ///     &x.encode_urn() as &str,
    ///     "urn:uuid:f3b4958c-52a1-11e7-802a-010203040506",
    /// );
    /// # Ok::<(), uuid1::ParseError>(())
    /// ```
    pub fn encode_urn(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        let mut buffer = [0u8; 45];
        buffer[..9].copy_from_slice(b"urn:uuid:");
        write_hyphenated(&self.0, &mut buffer[9..]);
        Encoded(buffer)
    }

    /// Renders the value in the requested encoding.
    pub fn format(&self, format: crate::Format) -> String {
        match format {
            crate::Format::Compact => self.encode_compact().to_string(),
            crate::Format::Default => self.encode().to_string(),
            crate::Format::Urn => self.encode_urn().to_string(),
        }
    }
}

fn write_hyphenated(src: &[u8; 16], dst: &mut [u8]) {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut dst_iter = dst.iter_mut();
    for (i, e) in src.iter().enumerate() {
        *dst_iter.next().unwrap() = DIGITS[(e >> 4) as usize];
        *dst_iter.next().unwrap() = DIGITS[(e & 15) as usize];
        if i == 3 || i == 5 || i == 7 || i == 9 {
            *dst_iter.next().unwrap() = b'-';
        }
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from any of the three supported encodings (8-4-4-4-12, 32-digit compact,
    /// or URN), accepting both uppercase and lowercase hexadecimal digits.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};

        let src = match src.get(..9) {
            Some(prefix) if src.len() == 45 && prefix.eq_ignore_ascii_case("urn:uuid:") => {
                &src[9..]
            }
            _ => src,
        };
        let hyphenated = match src.len() {
            36 => true,
            32 => false,
            _ => return Err(ERR),
        };

        let mut dst = [0u8; 16];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
            if hyphenated
                && (i == 3 || i == 5 || i == 7 || i == 9)
                && iter.next().ok_or(ERR)? != '-'
            {
                return Err(ERR);
            }
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Concrete return type of the encoders containing a stack-allocated string representation.
struct Encoded<const N: usize>([u8; N]);

impl<const N: usize> ops::Deref for Encoded<N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl<const N: usize> fmt::Display for Encoded<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid string representation")
    }
}

impl std::error::Error for ParseError {}

mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Uuid;

    /// Returns a collection of prepared cases
    fn prepare_cases() -> &'static [((u64, u16, u64), &'static str)] {
        const MAX_UINT60: u64 = (1 << 60) - 1;
        const MAX_UINT14: u16 = (1 << 14) - 1;
        const MAX_UINT48: u64 = (1 << 48) - 1;

        &[
            ((0, 0, 0), "00000000-0000-1000-8000-000000000000"),
            ((MAX_UINT60, 0, 0), "ffffffff-ffff-1fff-8000-000000000000"),
            ((0, MAX_UINT14, 0), "00000000-0000-1000-bfff-000000000000"),
            ((0, 0, MAX_UINT48), "00000000-0000-1000-8000-ffffffffffff"),
            (
                (MAX_UINT60, MAX_UINT14, MAX_UINT48),
                "ffffffff-ffff-1fff-bfff-ffffffffffff",
            ),
            // RFC 4122 reference vector: 2017-06-16T14:41:59.000001234Z, sequence 42
            (
                (0x1e752a1f3b4958c, 42, 0x010203040506),
                "f3b4958c-52a1-11e7-802a-010203040506",
            ),
        ]
    }

    /// Encodes and decodes prepared cases correctly
    #[test]
    fn encodes_and_decodes_prepared_cases_correctly() {
        for (fs, text) in prepare_cases() {
            let from_fields = Uuid::from_fields_v1(fs.0, fs.1, fs.2);
            assert_eq!(Ok(from_fields), text.parse());
            assert_eq!(Ok(from_fields), text.to_uppercase().parse());
            assert_eq!(&from_fields.encode() as &str, *text);
            assert_eq!(&from_fields.to_string(), text);

            let compact: String = text.chars().filter(|c| *c != '-').collect();
            assert_eq!(&from_fields.encode_compact() as &str, compact);
            assert_eq!(Ok(from_fields), compact.parse());

            let urn = format!("urn:uuid:{}", text);
            assert_eq!(&from_fields.encode_urn() as &str, urn);
            assert_eq!(Ok(from_fields), urn.parse());
            assert_eq!(Ok(from_fields), urn.to_uppercase().parse());
        }
    }

    /// Extracts field values of prepared cases correctly
    #[test]
    fn extracts_field_values_of_prepared_cases_correctly() {
        for (fs, _) in prepare_cases() {
            let e = Uuid::from_fields_v1(fs.0, fs.1, fs.2);
            assert_eq!(e.version(), 1);
            assert_eq!(e.timestamp_ticks(), fs.0);
            assert_eq!(e.clock_seq(), fs.1);
            assert_eq!(e.node_id(), fs.2);
        }
    }

    /// Returns error to invalid string representation
    #[test]
    fn returns_error_to_invalid_string_representation() {
        let cases = [
            "",
            " f3b4958c-52a1-11e7-802a-010203040506",
            "f3b4958c-52a1-11e7-802a-010203040506 ",
            " f3b4958c-52a1-11e7-802a-010203040506 ",
            "+f3b4958c-52a1-11e7-802a-010203040506",
            "-f3b4958c-52a1-11e7-802a-010203040506",
            "+3b4958c-52a1-11e7-802a-010203040506",
            "-3b4958c-52a1-11e7-802a-010203040506",
            "f3b4958c-52a111e7-802a-010203040506",
            "{f3b4958c-52a1-11e7-802a-010203040506}",
            "f3b4958c-52a1-11 7-802a-010203040506",
            "f3b4958g-52a1-11e7-802a-010203040506",
            "f3b4958c-52a1-11e7-802a_010203040506",
            "urn:uuuu:f3b4958c-52a1-11e7-802a-010203040506",
            "f3b4958c52a111e7802a01020304050",
            "f3b4958c52a111e7802a0102030405067",
        ];

        for e in cases {
            assert!(e.parse::<Uuid>().is_err(), "{:?}", e);
        }
    }

    /// Returns Nil and Max UUIDs
    #[test]
    fn returns_nil_and_max_uuids() {
        assert_eq!(
            &Uuid::NIL.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            &Uuid::MAX.to_string(),
            "ffffffff-ffff-ffff-ffff-ffffffffffff"
        );
    }

    /// Has symmetric converters
    #[test]
    fn has_symmetric_converters() {
        for (fs, _) in prepare_cases() {
            let e = Uuid::from_fields_v1(fs.0, fs.1, fs.2);
            assert_eq!(Uuid::from(<[u8; 16]>::from(e)), e);
            assert_eq!(Uuid::from(u128::from(e)), e);
            assert_eq!(Uuid::try_from(e.to_string()), Ok(e));
            assert_eq!(Uuid::try_from(e.to_string().to_uppercase()), Ok(e));
        }
    }

    /// Serializes and deserializes string and byte forms
    #[test]
    fn serializes_and_deserializes_string_and_byte_forms() {
        use serde_test::{assert_tokens, Configure, Token};

        const BYTES: &[u8; 16] = &[
            0xf3, 0xb4, 0x95, 0x8c, 0x52, 0xa1, 0x11, 0xe7, 0x80, 0x2a, 0x01, 0x02, 0x03, 0x04,
            0x05, 0x06,
        ];
        let cases: [(&'static str, &'static [u8]); 2] = [
            ("00000000-0000-0000-0000-000000000000", &[0u8; 16]),
            ("f3b4958c-52a1-11e7-802a-010203040506", BYTES),
        ];

        for (text, bytes) in cases {
            let e = text.parse::<Uuid>().unwrap();
            assert_tokens(&e.readable(), &[Token::String(text)]);
            assert_tokens(&e.compact(), &[Token::Bytes(bytes)]);
        }
    }
}
