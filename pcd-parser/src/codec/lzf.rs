//! LZF decompression for `DATA binary_compressed` payloads.
//!
//! The stream is a sequence of chunks, each led by a control byte:
//! - `000LLLLL`: literal run of `L + 1` bytes copied verbatim.
//! - `LLLddddd dddddddd`: back-reference of `L + 2` bytes, distance `d + 1`.
//! - `111ddddd eeeeeeee dddddddd`: as above with length `7 + e + 2`.

use log::trace;

use crate::error::CorruptionError;

const MAX_LITERAL: u8 = 1 << 5;
const LONG_MATCH: usize = 7;
// a 3-byte long back-reference produces at most 264 bytes
const MAX_EXPANSION: usize = 88;

/// Decompresses `input` into a buffer of exactly `out_len` bytes.
///
/// # Errors
/// Fails when the stream runs out mid-chunk, a back-reference points before
/// the start of the output or at bytes not yet written, or the stream would
/// produce more or fewer than `out_len` bytes.
pub fn decompress(input: &[u8], out_len: usize) -> Result<Vec<u8>, CorruptionError> {
    trace!(
        "Decompressing LZF: {} bytes -> {} bytes (expected)",
        input.len(),
        out_len
    );

    let reserve = out_len.min(input.len().saturating_mul(MAX_EXPANSION));
    let mut output = Vec::with_capacity(reserve);
    let mut in_pos = 0;

    while in_pos < input.len() {
        let ctrl = input[in_pos];
        in_pos += 1;

        if ctrl < MAX_LITERAL {
            let run = ctrl as usize + 1;
            if output.len() + run > out_len {
                return Err(CorruptionError::OutputOverflow {
                    needed: output.len() + run,
                    capacity: out_len,
                });
            }
            let literal = input
                .get(in_pos..in_pos + run)
                .ok_or(CorruptionError::TruncatedInput { at: in_pos })?;
            output.extend_from_slice(literal);
            in_pos += run;
            continue;
        }

        let mut len = (ctrl >> 5) as usize;
        if len == LONG_MATCH {
            len += *input
                .get(in_pos)
                .ok_or(CorruptionError::TruncatedInput { at: in_pos })? as usize;
            in_pos += 1;
        }
        let low = *input
            .get(in_pos)
            .ok_or(CorruptionError::TruncatedInput { at: in_pos })? as usize;
        in_pos += 1;

        let distance = (((ctrl & 0x1f) as usize) << 8 | low) + 1;
        let position = output.len();
        if distance > position {
            return Err(CorruptionError::InvalidBackReference { position, distance });
        }

        let count = len + 2;
        if position + count > out_len {
            return Err(CorruptionError::OutputOverflow {
                needed: position + count,
                capacity: out_len,
            });
        }

        // Source and destination may overlap: a short distance repeats the
        // bytes produced by this very copy.
        let mut reference = position - distance;
        for _ in 0..count {
            let byte = output[reference];
            output.push(byte);
            reference += 1;
        }
    }

    if output.len() != out_len {
        return Err(CorruptionError::LengthMismatch {
            expected: out_len,
            produced: output.len(),
        });
    }

    Ok(output)
}
