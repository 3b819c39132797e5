use wgapi_config::CodecLimits;

use crate::{IoError, IoResult};

/// Cursor over a borrowed byte slice that decodes little-endian primitives.
///
/// The reader carries the [`CodecLimits`] in force for the current decode
/// together with the nesting depth reached so far, so nested
/// [`Serializable`](crate::Serializable) impls share one budget.
pub struct MemoryReader<'a> {
    memory: &'a [u8],
    pos: usize,
    limits: CodecLimits,
    depth: usize,
}

impl<'a> MemoryReader<'a> {
    pub fn new(memory: &'a [u8]) -> Self {
        Self::with_limits(memory, CodecLimits::default())
    }

    pub fn with_limits(memory: &'a [u8], limits: CodecLimits) -> Self {
        Self {
            memory,
            pos: 0,
            limits,
            depth: 0,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Marks the start of a nested container.
    pub fn enter_nested(&mut self) -> IoResult<()> {
        if self.depth >= self.limits.max_depth {
            return Err(IoError::limit_exceeded(
                "nesting depth",
                self.limits.max_depth as u64,
                self.depth as u64 + 1,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline(always)]
    fn ensure_position(&self, move_by: usize) -> IoResult<()> {
        match self.pos.checked_add(move_by) {
            Some(end) if end <= self.memory.len() => Ok(()),
            _ => Err(IoError::UnexpectedEof),
        }
    }

    #[inline(always)]
    fn take<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        self.ensure_position(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.memory[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the input.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.memory.len() - self.pos
    }

    #[inline(always)]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.memory.len()
    }

    pub fn read_bool(&mut self) -> IoResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(IoError::invalid_data(format!(
                "Invalid boolean value {other:#04x}"
            ))),
        }
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> IoResult<u8> {
        self.ensure_position(1)?;
        let value = self.memory[self.pos];
        self.pos += 1;
        Ok(value)
    }

    #[inline(always)]
    pub fn read_u16(&mut self) -> IoResult<u16> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    #[inline(always)]
    pub fn read_u32(&mut self) -> IoResult<u32> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    #[inline(always)]
    pub fn read_i32(&mut self) -> IoResult<i32> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    #[inline(always)]
    pub fn read_u64(&mut self) -> IoResult<u64> {
        Ok(u64::from_le_bytes(self.take::<8>()?))
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> IoResult<i64> {
        Ok(i64::from_le_bytes(self.take::<8>()?))
    }

    #[inline(always)]
    pub fn read_f64(&mut self) -> IoResult<f64> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    /// Reads a variable-length integer and rejects values above `max`.
    pub fn read_var_int(&mut self, max: u64) -> IoResult<u64> {
        let b = self.read_u8()?;
        let value = match b {
            0xFD => self.read_u16()? as u64,
            0xFE => self.read_u32()? as u64,
            0xFF => self.read_u64()?,
            _ => b as u64,
        };
        if value > max {
            return Err(IoError::limit_exceeded("var-int", max, value));
        }
        Ok(value)
    }

    pub fn read_memory(&mut self, count: usize) -> IoResult<&'a [u8]> {
        self.ensure_position(count)?;
        let result = &self.memory[self.pos..self.pos + count];
        self.pos += count;
        Ok(result)
    }

    pub fn read_var_memory(&mut self, max: usize) -> IoResult<&'a [u8]> {
        let length = self.read_var_int(max as u64)? as usize;
        self.read_memory(length)
    }

    pub fn read_var_string(&mut self, max: usize) -> IoResult<String> {
        let data = self.read_var_memory(max)?;
        String::from_utf8(data.to_vec())
            .map_err(|_| IoError::invalid_data("Invalid UTF-8 sequence"))
    }

    /// Reads an element count bounded by `max_entries`.
    pub fn read_count(&mut self) -> IoResult<usize> {
        let max = self.limits.max_entries as u64;
        match self.read_var_int(u64::MAX)? {
            count if count > max => Err(IoError::limit_exceeded("entry count", max, count)),
            count => Ok(count as usize),
        }
    }

    /// Reads a length-prefixed payload bounded by `max_string_len`.
    pub fn read_bounded_memory(&mut self) -> IoResult<&'a [u8]> {
        let max = self.limits.max_string_len as u64;
        let length = self.read_var_int(u64::MAX)?;
        if length > max {
            return Err(IoError::limit_exceeded("payload length", max, length));
        }
        self.read_memory(length as usize)
    }

    /// Reads a UTF-8 string bounded by `max_string_len`.
    pub fn read_bounded_string(&mut self) -> IoResult<String> {
        let data = self.read_bounded_memory()?;
        String::from_utf8(data.to_vec())
            .map_err(|_| IoError::invalid_data("Invalid UTF-8 sequence"))
    }
}
