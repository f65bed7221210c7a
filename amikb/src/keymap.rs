//! Matrix position to scancode translation.
//!
//! Scancodes are 7-bit codes identifying physical key positions; the
//! direction bit is appended at queue time. Tables are plain configuration
//! data, fixed for the lifetime of the device.

use crate::config::KeyPos;

/// Marks an unassigned matrix position; no scancode is ever emitted for it.
pub const UNASSIGNED: u8 = 0xFF;

/// Caps Lock, the only stateful key on the board.
pub const CAPS_LOCK: u8 = 0x62;

/// A fixed ROWS x COLS scancode lookup table.
pub struct ScancodeTable<const ROWS: usize, const COLS: usize>(pub [[u8; COLS]; ROWS]);

impl<const ROWS: usize, const COLS: usize> ScancodeTable<ROWS, COLS> {
    /// Translate a matrix position; `None` for unassigned positions.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        match self.0[row][col] {
            UNASSIGNED => None,
            code => Some(code),
        }
    }
}

/// Amiga 500 German layout, Rev. A matrix.
///
/// The physical arrangement, highest column first:
///
/// ```text
///       COL15 COL14 COL13 COL12 COL11 COL10 COL9  COL8  COL7  COL6  COL5   COL4   COL3   COL2   COL1   COL0
/// ROW0  ESC    F1    F2    F3    F4    F5    F6    F7    F8    F9    F10    N.(    N.2    N.1    N.7    N.5
/// ROW1   ~     1     2     3     4     5     6     7     8     9     0      ss     '      \     Bkspc   Del
/// ROW2  TAB    Q     W     E     R     T     Z     U     I     O     P      Ue     +      Ret   Help    N.6
/// ROW3  Ctrl  Caps   A     S     D     F     G     H     J     K     L      Oe     Ae     #      Up     N.4
/// ROW4  LShft  <>    Y     X     C     V     B     N     M     ,     .      -     RShift Left   Down   Right
/// ROW5  L-Alt LAmi  Spc   N.*   N.-   N.Ent N./   N.9   N.3   N..   N.)    RAmi   RAlt    N.0    N.8    N.+
/// ```
#[rustfmt::skip]
pub static A500_DE: ScancodeTable<6, 16> = ScancodeTable([
//  COL0   COL1   COL2   COL3   COL4   COL5   COL6   COL7   COL8   COL9   COL10  COL11  COL12  COL13  COL14  COL15
  [ 0x2E,  0x3D,  0x1D,  0x1E,  0x5A,  0x59,  0x58,  0x57,  0x56,  0x55,  0x54,  0x53,  0x52,  0x51,  0x50,  0x45 ],  // ROW0
  [ 0x46,  0x41,  0x0D,  0x0C,  0x0B,  0x0A,  0x09,  0x08,  0x07,  0x06,  0x05,  0x04,  0x03,  0x02,  0x01,  0x00 ],  // ROW1
  [ 0x2F,  0x5F,  0x44,  0x1B,  0x1A,  0x19,  0x18,  0x17,  0x16,  0x15,  0x14,  0x13,  0x12,  0x11,  0x10,  0x42 ],  // ROW2
  [ 0x2D,  0x4C,  0x2B,  0x2A,  0x29,  0x28,  0x27,  0x26,  0x25,  0x24,  0x23,  0x22,  0x21,  0x20,  0x62,  0x63 ],  // ROW3
  [ 0x4E,  0x4D,  0x4F,  0x61,  0x3A,  0x39,  0x38,  0x37,  0x36,  0x35,  0x34,  0x33,  0x32,  0x31,  0x30,  0x60 ],  // ROW4
  [ 0x5E,  0x3E,  0x0F,  0x65,  0x67,  0x5B,  0x3C,  0x1F,  0x3F,  0x5C,  0x43,  0x4A,  0x5D,  0x40,  0x66,  0x64 ],  // ROW5
]);

/// Ctrl + LAmiga + RAmiga on the Rev. A matrix.
pub const A500_RESET_COMBO: [KeyPos; 3] = [
    KeyPos::new(3, 15), // Ctrl
    KeyPos::new(5, 14), // LAmiga
    KeyPos::new(5, 4),  // RAmiga
];
