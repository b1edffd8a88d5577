//! Sender-side framing: pack the base-16 encoded stream into QNAME payloads.
//!
//! Reworked from "write ASCII dots, then rewrite them to length bytes in a
//! second pass over the buffer" into a single pass that writes the
//! length-prefixed form directly and patches each label's length byte in
//! place once the label closes — a typed cursor over an owned buffer
//! instead of manual pointer arithmetic.

use std::collections::VecDeque;
use std::io::Read;

use crate::codec::encode_byte;
use crate::config::BaseDomain;
use crate::error::TunnelError;
use crate::wire::{build_header, write_question_trailer, MAX_LABEL_LEN, MAX_QNAME_LEN};

/// Produces one DNS query packet per call from an underlying byte stream,
/// encoding it on the fly and framing it into QNAME labels.
pub struct Framer<R> {
    reader: R,
    /// At most two pending encoded characters (the two halves of one source
    /// byte); keeping both queued together is what guarantees a packet never
    /// ends mid-pair except via the oddness guard.
    queue: VecDeque<u8>,
    eof: bool,
    bytes_consumed: usize,
}

impl<R: Read> Framer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            queue: VecDeque::with_capacity(2),
            eof: false,
            bytes_consumed: 0,
        }
    }

    /// Total source bytes read (and encoded) so far.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    fn fill(&mut self) -> Result<(), TunnelError> {
        if self.queue.is_empty() && !self.eof {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte)? {
                0 => self.eof = true,
                _ => {
                    let (h, l) = encode_byte(byte[0]);
                    self.queue.push_back(h);
                    self.queue.push_back(l);
                    self.bytes_consumed += 1;
                }
            }
        }
        Ok(())
    }

    fn next_char(&mut self) -> Result<Option<u8>, TunnelError> {
        self.fill()?;
        Ok(self.queue.pop_front())
    }

    /// True once every source byte has been consumed and framed.
    pub fn is_exhausted(&mut self) -> Result<bool, TunnelError> {
        self.fill()?;
        Ok(self.queue.is_empty())
    }

    /// Builds the next data packet, or `None` once the stream is exhausted
    /// (the zero-byte-file case: no data packets at all, per §4.3).
    pub fn next_packet(
        &mut self,
        chunk_id: u16,
        base: &BaseDomain,
    ) -> Result<Option<Vec<u8>>, TunnelError> {
        if self.is_exhausted()? {
            return Ok(None);
        }

        let mut packet = build_header(chunk_id, true, 0).to_vec();

        // Budget for the data portion of the QNAME: total QNAME capacity
        // minus the base domain's length-prefixed, zero-terminated form.
        let capacity_budget = MAX_QNAME_LEN - base.prefixed().len();

        let mut qname_data: Vec<u8> = vec![0]; // length-byte slot for the first label
        let mut lock = 0usize;
        let mut label_capacity = MAX_LABEL_LEN;
        let mut label_count = 0usize;
        let mut char_count = 0usize;
        // The first label's length byte is already in `qname_data`; charge it
        // against the budget so every subsequent length byte (charged in the
        // `else` branch below) and data char stays within MAX_QNAME_LEN.
        let mut remaining = capacity_budget - 1;

        while remaining > 0 {
            // Never let a packet end on an odd character count: that would
            // split an encoded byte pair across two packets.
            let oddness_guard = remaining == 1 && char_count % 2 == 0;
            if label_capacity > 0 && !oddness_guard {
                match self.next_char()? {
                    Some(c) => {
                        qname_data.push(c);
                        char_count += 1;
                        label_capacity -= 1;
                        label_count += 1;
                        remaining -= 1;
                    }
                    None => break, // EOF: finalize below
                }
            } else {
                remaining -= 1;
                if remaining > 0 {
                    qname_data[lock] = label_count as u8;
                    lock = qname_data.len();
                    qname_data.push(0);
                    label_count = 0;
                    label_capacity = MAX_LABEL_LEN;
                }
                // else: leave the label open; the post-loop finalize closes it.
            }
        }
        qname_data[lock] = label_count as u8;

        packet.extend_from_slice(&qname_data);
        packet.extend_from_slice(base.prefixed());
        write_question_trailer(&mut packet);

        Ok(Some(packet))
    }
}
