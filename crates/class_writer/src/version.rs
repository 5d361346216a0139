use std::fmt;

/// A class file format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    pub const V1_1: ClassVersion = ClassVersion::new(45, 3);
    pub const V1_2: ClassVersion = ClassVersion::new(46, 0);
    pub const V1_3: ClassVersion = ClassVersion::new(47, 0);
    pub const V1_4: ClassVersion = ClassVersion::new(48, 0);
    pub const V1_5: ClassVersion = ClassVersion::new(49, 0);
    pub const V1_6: ClassVersion = ClassVersion::new(50, 0);
    pub const V1_7: ClassVersion = ClassVersion::new(51, 0);
    pub const V1_8: ClassVersion = ClassVersion::new(52, 0);
    pub const V9: ClassVersion = ClassVersion::new(53, 0);
    pub const V10: ClassVersion = ClassVersion::new(54, 0);
    pub const V11: ClassVersion = ClassVersion::new(55, 0);
    pub const V12: ClassVersion = ClassVersion::new(56, 0);
    pub const V13: ClassVersion = ClassVersion::new(57, 0);
    pub const V14: ClassVersion = ClassVersion::new(58, 0);
    pub const V15: ClassVersion = ClassVersion::new(59, 0);
    pub const V16: ClassVersion = ClassVersion::new(60, 0);
    pub const V17: ClassVersion = ClassVersion::new(61, 0);
    pub const V18: ClassVersion = ClassVersion::new(62, 0);
    pub const V19: ClassVersion = ClassVersion::new(63, 0);
    pub const V20: ClassVersion = ClassVersion::new(64, 0);
    pub const V21: ClassVersion = ClassVersion::new(65, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for ClassVersion {
    fn default() -> Self {
        Self::V1_8
    }
}

impl fmt::Display for ClassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
