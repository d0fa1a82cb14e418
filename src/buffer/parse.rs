// SPDX-License-Identifier: Apache-2.0

use num_traits::PrimInt;
use crate::Buffer;
use crate::error::{Error, NumberFormatError, Result};
use crate::pool::Pool;

// The accumulator runs negated so `i64::MIN` parses without overflowing, then
// flips the sign at the end. Overflow is caught against a pre-computed
// sentinel: past `OVERFLOW_ZONE` any further digit overflows, and at it only
// digits up to `OVERFLOW_DIGIT` fit.
const OVERFLOW_ZONE: i64 = i64::MIN / 10;
const OVERFLOW_DIGIT: i64 = -(i64::MIN % 10);

impl<P: Pool> Buffer<P> {
	/// Reads a signed decimal long from the head, such as `-8192`, stopping at
	/// the first byte that is not a digit. Fails with a number format error
	/// naming the literal when it overflows an `i64`, and when no digits are
	/// present.
	pub fn read_decimal_long(&mut self) -> Result<i64> {
		let mut literal = String::new();
		let mut negative = false;

		if self.get(0).ok() == Some(b'-') {
			negative = true;
			literal.push('-');
			self.skip(1)?;
		}

		let mut value = 0i64;
		let mut digits = 0usize;
		loop {
			let Ok(byte) = self.get(0) else { break };
			if !byte.is_ascii_digit() { break }

			let digit = (byte - b'0') as i64;
			if value < OVERFLOW_ZONE || (value == OVERFLOW_ZONE && digit > OVERFLOW_DIGIT) {
				literal.push(byte as char);
				return Err(Error::number_format(NumberFormatError::Overflow { literal }))
			}

			value = value * 10 - digit;
			literal.push(byte as char);
			digits += 1;
			self.skip(1)?;
		}

		if digits == 0 {
			let found = self.get(0).ok();
			return Err(Error::number_format(NumberFormatError::NoDigits { found }))
		}

		if negative {
			Ok(value)
		} else if value == i64::MIN {
			// The magnitude fit the negated accumulator but not the positive
			// range.
			Err(Error::number_format(NumberFormatError::Overflow { literal }))
		} else {
			Ok(-value)
		}
	}

	/// Reads an unsigned hexadecimal long from the head, such as `ffff` or
	/// `FFFF`, stopping at the first byte that is not a hex digit. Fails with a
	/// number format error naming the literal when it overflows a `u64`, and
	/// when no hex digits are present.
	pub fn read_hex_long(&mut self) -> Result<u64> {
		let mut literal = String::new();
		let mut value = 0u64;
		let mut digits = 0usize;

		loop {
			let Ok(byte) = self.get(0) else { break };
			let Some(digit) = hex_digit::<u64>(byte) else { break };

			if value > u64::MAX >> 4 {
				literal.push(byte as char);
				return Err(Error::number_format(NumberFormatError::Overflow { literal }))
			}

			value = value << 4 | digit;
			literal.push(byte as char);
			digits += 1;
			self.skip(1)?;
		}

		if digits == 0 {
			let found = self.get(0).ok();
			return Err(Error::number_format(NumberFormatError::NoDigits { found }))
		}
		Ok(value)
	}
}

/// Converts an ASCII hex digit, uppercase or lowercase, into any integer type.
fn hex_digit<N: PrimInt>(byte: u8) -> Option<N> {
	let digit = match byte {
		b'0'..=b'9' => byte - b'0',
		b'a'..=b'f' => byte - b'a' + 10,
		b'A'..=b'F' => byte - b'A' + 10,
		_ => return None,
	};
	N::from(digit)
}
