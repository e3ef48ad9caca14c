use crate::{Error, Result, Transport};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// What a [`ScriptedTransport`] observed, shared with the test after the transport has been
/// moved into a connection.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub recv_calls: usize,
    pub send_calls: usize,
    pub sent: Vec<u8>,
    pub closed: bool,
}

/// One step of a receive script: a chunk of bytes or a raw OS error code.
#[derive(Debug)]
pub enum Step {
    Data(Vec<u8>),
    Fail(i32),
}

/// An in-memory transport that hands out a fixed script of chunks, one chunk per receive call,
/// and reports an orderly shutdown once the script runs out.
///
/// A chunk larger than the receive buffer is split, with the remainder delivered by the next
/// call, the same way a kernel socket buffer behaves.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    max_send: Option<usize>,
    valid: bool,
    log: Arc<Mutex<TransportLog>>,
}
impl ScriptedTransport {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self::from_steps(chunks.iter().map(|c| Step::Data(c.to_vec())))
    }
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            max_send: None,
            valid: true,
            log: Arc::default(),
        }
    }
    /// Splits `data` into chunks of `chunk_len` bytes.
    pub fn chunked(data: &[u8], chunk_len: usize) -> Self {
        Self::from_steps(data.chunks(chunk_len).map(|c| Step::Data(c.to_vec())))
    }
    /// A transport that reports itself as already invalid.
    pub fn invalid() -> Self {
        let mut ret = Self::new(&[]);
        ret.valid = false;
        ret
    }
    /// Caps how many bytes a single send call accepts.
    pub fn max_send(mut self, max_send: usize) -> Self {
        self.max_send = Some(max_send);
        self
    }
    pub fn log(&self) -> Arc<Mutex<TransportLog>> { Arc::clone(&self.log) }
}
impl Transport for ScriptedTransport {
    fn is_valid(&self) -> bool { self.valid }
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.log.lock().unwrap().recv_calls += 1;
        match self.script.pop_front() {
            None => Ok(0),
            Some(Step::Fail(code)) => Err(Error::read(code)),
            Some(Step::Data(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.script.push_front(Step::Data(chunk.split_off(n)));
                }
                Ok(n)
            }
        }
    }
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.max_send.map_or(buf.len(), |max| max.min(buf.len()));
        let mut log = self.log.lock().unwrap();
        log.send_calls += 1;
        log.sent.extend_from_slice(&buf[..n]);
        Ok(n)
    }
    fn close(&mut self) -> Result<()> {
        self.valid = false;
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// A transport that fails the test if any I/O reaches it.
#[derive(Debug)]
pub struct PanickingTransport;
impl Transport for PanickingTransport {
    fn is_valid(&self) -> bool { true }
    fn recv(&mut self, _: &mut [u8]) -> Result<usize> { panic!("recv must not be reached") }
    fn send(&mut self, _: &[u8]) -> Result<usize> { panic!("send must not be reached") }
    fn close(&mut self) -> Result<()> { Ok(()) }
}
