use std::io::{Read, Write};

use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter};

/// Destination for variable width codes.
pub trait CodeWriter {
    fn write(&mut self, code: u16, width: u8) -> Result<(), std::io::Error>;

    /// Pads the last partial byte with zero bits and writes it out.
    fn fill(&mut self) -> Result<(), std::io::Error>;

    fn flush(&mut self) -> Result<(), std::io::Error>;

    fn bits_written(&self) -> u64;
}

impl<C: CodeWriter + ?Sized> CodeWriter for &mut C {
    #[inline]
    fn write(&mut self, code: u16, width: u8) -> Result<(), std::io::Error> {
        (**self).write(code, width)
    }

    fn fill(&mut self) -> Result<(), std::io::Error> {
        (**self).fill()
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        (**self).flush()
    }

    fn bits_written(&self) -> u64 {
        (**self).bits_written()
    }
}

/// Source of variable width codes.
pub trait CodeReader {
    /// Reads the next `width` bits. Running out of input is reported as
    /// [std::io::ErrorKind::UnexpectedEof].
    fn read(&mut self, width: u8) -> Result<u16, std::io::Error>;
}

/// Packs codes into bytes, in the bit order given by `E`.
pub struct BitPacker<W, E>
where
    W: Write,
    E: bitstream_io::Endianness,
{
    writer: BitWriter<W, E>,
    bits_written: u64,
}

impl<W, E> BitPacker<W, E>
where
    W: Write,
    E: bitstream_io::Endianness,
{
    pub fn new(write: W, endianness: E) -> Self {
        Self {
            writer: BitWriter::endian(write, endianness),
            bits_written: 0,
        }
    }
}

impl<W, E> CodeWriter for BitPacker<W, E>
where
    W: Write,
    E: bitstream_io::Endianness,
{
    #[inline]
    fn write(&mut self, code: u16, width: u8) -> Result<(), std::io::Error> {
        self.writer.write(u32::from(width), code)?;
        self.bits_written += u64::from(width);
        Ok(())
    }

    #[inline]
    fn fill(&mut self) -> Result<(), std::io::Error> {
        self.writer.byte_align()
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        match self.writer.writer() {
            Some(write) => write.flush(),
            // Mid byte, nothing complete to hand over yet.
            None => Ok(()),
        }
    }

    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}

/// Reads back codes written by a [BitPacker] with the same bit order.
pub struct BitUnpacker<R, E>
where
    R: Read,
    E: bitstream_io::Endianness,
{
    reader: BitReader<R, E>,
}

impl<R, E> BitUnpacker<R, E>
where
    R: Read,
    E: bitstream_io::Endianness,
{
    pub fn new(read: R, endianness: E) -> Self {
        Self {
            reader: BitReader::endian(read, endianness),
        }
    }
}

impl<R, E> CodeReader for BitUnpacker<R, E>
where
    R: Read,
    E: bitstream_io::Endianness,
{
    #[inline]
    fn read(&mut self, width: u8) -> Result<u16, std::io::Error> {
        self.reader.read(u32::from(width))
    }
}
