use std::io::{self, Write};

use clap::ValueEnum;

pub const BYTE_BITS: usize = u8::BITS as usize;
pub const BYTE_HEX_DIGITS: usize = BYTE_BITS / 4;

const HEX_PREFIX: &str = "0x";
const BIN_PREFIX: &str = "0b";
const NO_DIFF: u8 = b'.';

/// How a differing byte pair is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RenderMode {
    /// Two hex digits per byte
    Hex,
    /// Eight binary digits per byte
    Binary,
    /// Binary digits for differing bits only, '.' elsewhere
    #[default]
    Bits,
}

/// Renders one differing byte pair at a time.
///
/// One renderer is built per run and re-initialised for every pair, so the
/// scratch buffer is allocated once.
#[derive(Debug, Clone)]
pub struct ByteRenderer {
    mode: RenderMode,
    delim: char,
    scratch: [u8; BYTE_BITS],
    a: u8,
    b: u8,
    mask: u8,
}

impl ByteRenderer {
    pub fn new(mode: RenderMode, delim: char) -> Self {
        Self {
            mode,
            delim,
            scratch: [0; BYTE_BITS],
            a: 0,
            b: 0,
            mask: 0,
        }
    }

    pub fn init(&mut self, a: u8, b: u8) {
        self.a = a;
        self.b = b;
        self.mask = a ^ b;
    }

    /// Number of bits that differ between the current pair.
    pub fn popcount(&self) -> u32 {
        self.mask.count_ones()
    }

    /// Writes `<A><delim><B>` with no trailing newline.
    pub fn render<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        let (a, b) = (self.a, self.b);
        let mut delim = [0u8; 4];
        let delim = self.delim.encode_utf8(&mut delim).as_bytes();

        self.write_operand(a, out)?;
        out.write_all(delim)?;
        self.write_operand(b, out)
    }

    pub fn render_to_string(&mut self) -> String {
        let mut out = Vec::with_capacity(2 * (BIN_PREFIX.len() + BYTE_BITS) + 4);
        // Writing into a Vec cannot fail.
        let _ = self.render(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn write_operand<W: Write + ?Sized>(&mut self, value: u8, out: &mut W) -> io::Result<()> {
        let (prefix, width) = match self.mode {
            RenderMode::Hex => {
                hex::encode_to_slice([value], &mut self.scratch[..BYTE_HEX_DIGITS])
                    .map_err(io::Error::other)?;
                (HEX_PREFIX, BYTE_HEX_DIGITS)
            }
            RenderMode::Binary => {
                bit_pattern(value, u8::MAX, &mut self.scratch);
                (BIN_PREFIX, BYTE_BITS)
            }
            RenderMode::Bits => {
                bit_pattern(value, self.mask, &mut self.scratch);
                (BIN_PREFIX, BYTE_BITS)
            }
        };

        out.write_all(prefix.as_bytes())?;
        out.write_all(&self.scratch[..width])
    }
}

/// MSB first. Positions outside `mask` become [`NO_DIFF`].
fn bit_pattern(value: u8, mask: u8, scratch: &mut [u8; BYTE_BITS]) {
    for (i, slot) in scratch.iter_mut().enumerate() {
        let bit = 1u8 << (BYTE_BITS - 1 - i);
        *slot = if mask & bit == 0 {
            NO_DIFF
        } else if value & bit == 0 {
            b'0'
        } else {
            b'1'
        };
    }
}
