use bitflags::bitflags;

bitflags! {
    /// Access and property flags of a class, field or method.
    ///
    /// Bits above `0xFFFF` are pseudo flags: they select attributes or class kinds but are
    /// never written to an `access_flags` item.
    #[derive(Default)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MANDATED = 0x8000;
        const MODULE = 0x8000;

        const RECORD = 0x1_0000;
        const DEPRECATED = 0x2_0000;
    }
}

impl AccessFlags {
    /// The `u2` value written to the class file once `mask` has been removed.
    pub(crate) fn to_u2(self, mask: AccessFlags) -> u16 {
        (self.bits() & !mask.bits() & 0xFFFF) as u16
    }
}

#[cfg(test)]
mod to_u2_tests {
    use super::*;

    #[test]
    fn it_should_drop_pseudo_flags() {
        let flags = AccessFlags::PUBLIC | AccessFlags::RECORD | AccessFlags::DEPRECATED;

        assert_eq!(0x0001, flags.to_u2(AccessFlags::empty()));
    }

    #[test]
    fn it_should_remove_masked_bits() {
        let flags = AccessFlags::PUBLIC | AccessFlags::SYNTHETIC;

        assert_eq!(0x0001, flags.to_u2(AccessFlags::SYNTHETIC));
        assert_eq!(0x1001, flags.to_u2(AccessFlags::DEPRECATED));
    }
}
