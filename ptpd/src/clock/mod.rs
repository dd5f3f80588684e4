//! The system clock, steered through the kernel's ntp interface

use ptp_proto::{Clock, TimeInternal};

/// The kernel takes frequency offsets in ppm with a 16 bit fractional part
const FREQUENCY_SCALE: i64 = 65536;

/// Largest frequency offset the kernel accepts, 500 ppm
const MAX_KERNEL_FREQUENCY: i64 = 500 * FREQUENCY_SCALE;

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("insufficient permissions to adjust the clock")]
    NoPermission,
    #[error("the kernel rejected the adjustment")]
    Invalid,
    #[error("clock device not found")]
    NoDevice,
    #[error("the clock does not support this adjustment")]
    NotSupported,
    #[error("clock error: {0}")]
    Other(std::io::Error),
}

// Convert those error numbers that can occur for the clock_* and ntp_adjtime
// calls
fn convert_errno() -> ClockError {
    let error = std::io::Error::last_os_error();
    match error.raw_os_error() {
        Some(libc::EINVAL) => ClockError::Invalid,
        Some(libc::ENODEV) => ClockError::NoDevice,
        Some(libc::EOPNOTSUPP) => ClockError::NotSupported,
        Some(libc::EPERM) => ClockError::NoPermission,
        _ => ClockError::Other(error),
    }
}

/// Turn a C failure (-1 is returned) into a rust Result
fn cerr(t: libc::c_int) -> Result<libc::c_int, ClockError> {
    match t {
        -1 => Err(convert_errno()),
        _ => Ok(t),
    }
}

fn ntp_adjtime(timex: &mut libc::timex) -> Result<(), ClockError> {
    #[cfg(all(target_os = "linux", target_env = "musl"))]
    use libc::adjtimex as adjtime;
    #[cfg(not(all(target_os = "linux", target_env = "musl")))]
    use libc::ntp_adjtime as adjtime;

    // The return value carries the clock state on success, which we have no
    // use for.
    //
    // # Safety
    //
    // The reference always points to a valid libc::timex.
    cerr(unsafe { adjtime(timex) }).map(|_| ())
}

fn empty_timex() -> libc::timex {
    // # Safety
    //
    // timex is a plain C struct for which all zeroes is a valid value, and
    // the one the kernel expects for fields not selected by `modes`.
    unsafe { std::mem::zeroed() }
}

/// Frequency offset in the kernel's scaled ppm for a rate change in ppb
fn kernel_frequency(ppb: i32) -> libc::c_long {
    let scaled = ppb as i64 * FREQUENCY_SCALE / 1000;
    scaled.clamp(-MAX_KERNEL_FREQUENCY, MAX_KERNEL_FREQUENCY) as libc::c_long
}

/// Split an offset into whole seconds and non-negative nanoseconds, the form
/// ADJ_SETOFFSET wants
fn setoffset_parts(offset: TimeInternal) -> (i64, i64) {
    let mut seconds = offset.seconds as i64;
    let mut nanos = offset.nanoseconds as i64;
    if nanos < 0 {
        seconds -= 1;
        nanos += 1_000_000_000;
    }
    (seconds, nanos)
}

/// A linux clock identified by its clock id.
///
/// Steering the clock requires `CAP_SYS_TIME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxClock {
    id: libc::clockid_t,
}

impl LinuxClock {
    pub const REALTIME: Self = Self {
        id: libc::CLOCK_REALTIME,
    };

    fn try_now(&self) -> Result<TimeInternal, ClockError> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // # Safety
        //
        // The pointer refers to a valid timespec for the duration of the call
        cerr(unsafe { libc::clock_gettime(self.id, &mut ts) })?;
        Ok(TimeInternal::new(ts.tv_sec as i32, ts.tv_nsec as i32))
    }
}

impl Clock for LinuxClock {
    type Error = ClockError;

    fn now(&self) -> TimeInternal {
        self.try_now().unwrap_or_else(|error| {
            log::error!("could not read the clock: {error}");
            TimeInternal::ZERO
        })
    }

    fn set_time(&mut self, time: TimeInternal) -> Result<(), Self::Error> {
        let ts = libc::timespec {
            tv_sec: time.seconds as libc::time_t,
            tv_nsec: time.nanoseconds as _,
        };
        // # Safety
        //
        // The pointer refers to a valid timespec for the duration of the call
        cerr(unsafe { libc::clock_settime(self.id, &ts) })?;
        log::info!("clock set to {time}");
        Ok(())
    }

    fn adjust_frequency(&mut self, ppb: i32) -> Result<(), Self::Error> {
        let mut timex = empty_timex();
        timex.modes = libc::ADJ_FREQUENCY;
        timex.freq = kernel_frequency(ppb);
        ntp_adjtime(&mut timex)
    }

    fn apply_offset(&mut self, offset: TimeInternal) -> Result<(), Self::Error> {
        let (seconds, nanos) = setoffset_parts(offset);

        let mut timex = empty_timex();
        timex.modes = libc::ADJ_SETOFFSET | libc::ADJ_NANO;
        timex.time.tv_sec = seconds as libc::time_t;
        // with ADJ_NANO the microseconds field holds nanoseconds
        timex.time.tv_usec = nanos as libc::suseconds_t;
        ntp_adjtime(&mut timex)?;

        log::info!("clock stepped by {offset}");
        Ok(())
    }
}
