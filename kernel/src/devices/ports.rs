//! Byte-wide port I/O.
//!
//! Drivers talk to ports through [`PortIo`] so the same protocol code runs
//! against the real bus or a scripted device.

/// Byte-wide access to the I/O address space.
pub trait PortIo: Sync {
    /// Reads one byte from `port`.
    fn read(&self, port: u16) -> u8;
    /// Writes `value` to `port`.
    fn write(&self, port: u16, value: u8);
}

impl<T: PortIo + ?Sized> PortIo for &T {
    fn read(&self, port: u16) -> u8 {
        (**self).read(port)
    }

    fn write(&self, port: u16, value: u8) {
        (**self).write(port, value)
    }
}

/// The processor's I/O address space (`in`/`out`).
pub struct HardwarePorts {
    _private: (),
}

impl HardwarePorts {
    /// # Safety
    /// Port I/O can have arbitrary side effects on the machine. The caller
    /// must be the only driver of every port it reaches through this value.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "x86_64")]
impl PortIo for HardwarePorts {
    fn read(&self, port: u16) -> u8 {
        use x86_64::instructions::port::Port;
        unsafe { Port::<u8>::new(port).read() }
    }

    fn write(&self, port: u16, value: u8) {
        use x86_64::instructions::port::Port;
        unsafe { Port::<u8>::new(port).write(value) }
    }
}

#[cfg(target_arch = "x86")]
impl PortIo for HardwarePorts {
    fn read(&self, port: u16) -> u8 {
        let value: u8;
        unsafe {
            core::arch::asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn write(&self, port: u16, value: u8) {
        unsafe {
            core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
        }
    }
}
