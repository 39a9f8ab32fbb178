//! Blocking client
//!
//! One TCP connection, one request in flight at a time. Calls are sent
//! exactly once; there is no retry.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{ListError, Result};
use crate::protocol::{
    read_response, write_request, AppendReply, Request, Response, SizeReply, ValueReply,
};

/// Client for a RemoteList server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Bound how long a call may wait for its response
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one request and wait for its response
    pub fn call(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }

    /// Append `value` to `list_id`
    pub fn append(&mut self, list_id: &str, value: i64) -> Result<bool> {
        let reply: AppendReply = self.call(&Request::append(list_id, value))?.into_reply()?;
        Ok(reply.success)
    }

    /// Remove and return the tail of `list_id`
    pub fn remove(&mut self, list_id: &str) -> Result<i64> {
        let reply: ValueReply = self.call(&Request::remove(list_id))?.into_reply()?;
        Ok(reply.value)
    }

    /// Value at `index` in `list_id`
    pub fn get(&mut self, list_id: &str, index: i64) -> Result<i64> {
        let reply: ValueReply = self.call(&Request::get(list_id, index))?.into_reply()?;
        Ok(reply.value)
    }

    /// Length of `list_id`
    pub fn size(&mut self, list_id: &str) -> Result<i64> {
        let reply: SizeReply = self.call(&Request::size(list_id))?.into_reply()?;
        Ok(reply.size)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Request::Ping)?;
        if response.is_ok() {
            Ok(())
        } else {
            Err(ListError::Network(format!(
                "unexpected ping status {:?}",
                response.status
            )))
        }
    }
}
