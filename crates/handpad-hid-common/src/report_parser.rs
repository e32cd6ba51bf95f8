//! Bounds-checked raw report reading and fixed-layout report building.

use handpad_errors::{TransportError, TransportResult};

fn short(expected: usize, actual: usize) -> TransportError {
    TransportError::ShortReport { expected, actual }
}

/// Cursor plus random-access reader over one raw input report.
#[derive(Debug, Clone, Copy)]
pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Fail early when the report cannot hold `len` bytes.
    ///
    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if the buffer is shorter than `len`.
    pub fn require(&self, len: usize) -> TransportResult {
        if self.buffer.len() < len {
            return Err(short(len, self.buffer.len()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn bytes_at<const N: usize>(&self, offset: usize) -> TransportResult<[u8; N]> {
        let end = offset.checked_add(N).unwrap_or(usize::MAX);
        self.buffer
            .get(offset..end)
            .and_then(|slice| <[u8; N]>::try_from(slice).ok())
            .ok_or_else(|| short(end, self.buffer.len()))
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if `offset` is past the end.
    pub fn u8_at(&self, offset: usize) -> TransportResult<u8> {
        self.bytes_at::<1>(offset).map(|[b]| b)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if the field runs past the end.
    pub fn u16_le_at(&self, offset: usize) -> TransportResult<u16> {
        self.bytes_at::<2>(offset).map(u16::from_le_bytes)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if the field runs past the end.
    pub fn i16_le_at(&self, offset: usize) -> TransportResult<i16> {
        self.bytes_at::<2>(offset).map(i16::from_le_bytes)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if the field runs past the end.
    pub fn u32_le_at(&self, offset: usize) -> TransportResult<u32> {
        self.bytes_at::<4>(offset).map(u32::from_le_bytes)
    }

    /// Bit `bit` (0 = LSB) of byte `offset`.
    ///
    /// # Errors
    ///
    /// [`TransportError::ShortReport`] if `offset` is past the end.
    pub fn bit_at(&self, offset: usize, bit: u8) -> TransportResult<bool> {
        let byte = self.u8_at(offset)?;
        Ok(byte.checked_shr(u32::from(bit)).is_some_and(|b| b & 1 == 1))
    }

    fn advance<const N: usize>(&mut self) -> TransportResult<[u8; N]> {
        let bytes = self.bytes_at::<N>(self.position)?;
        self.position = self.position.saturating_add(N);
        Ok(bytes)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] at the end of the report.
    pub fn read_u8(&mut self) -> TransportResult<u8> {
        self.advance::<1>().map(|[b]| b)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] at the end of the report.
    pub fn read_u16_le(&mut self) -> TransportResult<u16> {
        self.advance::<2>().map(u16::from_le_bytes)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] at the end of the report.
    pub fn read_i16_le(&mut self) -> TransportResult<i16> {
        self.advance::<2>().map(i16::from_le_bytes)
    }

    /// # Errors
    ///
    /// [`TransportError::ShortReport`] at the end of the report.
    pub fn read_u32_le(&mut self) -> TransportResult<u32> {
        self.advance::<4>().map(u32::from_le_bytes)
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }

    pub fn seek(&mut self, offset: usize) {
        self.position = offset.min(self.buffer.len());
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.buffer
    }
}

/// Zero-filled fixed-size report written at absolute offsets.
///
/// Writes outside the buffer are dropped and flagged; a well-formed layout
/// never sets [`ReportBuilder::overflowed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBuilder {
    buffer: Vec<u8>,
    overflowed: bool,
}

impl ReportBuilder {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0u8; len],
            overflowed: false,
        }
    }

    fn put<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) -> &mut Self {
        let end = offset.checked_add(N).unwrap_or(usize::MAX);
        match self.buffer.get_mut(offset..end) {
            Some(slot) => slot.copy_from_slice(&bytes),
            None => self.overflowed = true,
        }
        self
    }

    pub fn put_u8(&mut self, offset: usize, value: u8) -> &mut Self {
        self.put(offset, [value])
    }

    pub fn put_u16_le(&mut self, offset: usize, value: u16) -> &mut Self {
        self.put(offset, value.to_le_bytes())
    }

    pub fn put_i16_le(&mut self, offset: usize, value: i16) -> &mut Self {
        self.put(offset, value.to_le_bytes())
    }

    pub fn put_bytes(&mut self, offset: usize, data: &[u8]) -> &mut Self {
        let end = offset.checked_add(data.len()).unwrap_or(usize::MAX);
        match self.buffer.get_mut(offset..end) {
            Some(slot) => slot.copy_from_slice(data),
            None => self.overflowed = true,
        }
        self
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
