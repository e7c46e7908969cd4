#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use pkv_client::PoolConfig;

pub type Handler = fn(usize, Vec<Vec<u8>>, &mut TcpStream);

/// Scripted single-connection RESP server. Returns the bound port.
pub fn spawn_server(expected_commands: usize, handler: Handler) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        for idx in 0..expected_commands {
            let args = read_command(&mut reader).expect("read command");
            handler(idx, args, &mut stream);
        }
    });

    port
}

/// Pool settings for a single scripted connection, no handshake, no eviction.
pub fn config_for(port: u16) -> PoolConfig {
    PoolConfig {
        host: "127.0.0.1".to_string(),
        port,
        max_total: 1,
        max_idle: 1,
        max_wait: Duration::from_secs(1),
        timeout: Duration::from_secs(1),
        test_while_idle: false,
        password: None,
        database: 0,
        ..PoolConfig::default()
    }
}

fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let mut line = Vec::new();
    read_line(reader, &mut line)?;
    if line.first() != Some(&b'*') {
        return Err(invalid("expected array"));
    }
    let count = parse_usize(&line[1..])?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        read_line(reader, &mut line)?;
        if line.first() != Some(&b'$') {
            return Err(invalid("expected bulk"));
        }
        let len = parse_usize(&line[1..])?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data)?;
        if !data.ends_with(b"\r\n") {
            return Err(invalid("missing crlf"));
        }
        data.truncate(len);
        args.push(data);
    }
    Ok(args)
}

fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    if !buf.ends_with(b"\r\n") {
        return Err(invalid("invalid line"));
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_usize(data: &[u8]) -> std::io::Result<usize> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| invalid("digit"))
}

fn invalid(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string())
}

pub fn arg(args: &[Vec<u8>], idx: usize) -> &str {
    std::str::from_utf8(&args[idx]).expect("utf8 arg")
}

/// Every part of a command as text, name first.
pub fn words(args: &[Vec<u8>]) -> Vec<String> {
    args.iter().map(|a| String::from_utf8_lossy(a).into_owned()).collect()
}

fn send(stream: &mut TcpStream, frame: &[u8]) {
    let _ = stream.write_all(frame);
    let _ = stream.flush();
}

pub fn write_simple(stream: &mut TcpStream, msg: &str) {
    send(stream, format!("+{msg}\r\n").as_bytes());
}

pub fn write_error(stream: &mut TcpStream, msg: &str) {
    send(stream, format!("-{msg}\r\n").as_bytes());
}

pub fn write_integer(stream: &mut TcpStream, value: i64) {
    send(stream, format!(":{value}\r\n").as_bytes());
}

pub fn write_bulk(stream: &mut TcpStream, data: &str) {
    send(stream, format!("${}\r\n{data}\r\n", data.len()).as_bytes());
}

pub fn write_null(stream: &mut TcpStream) {
    send(stream, b"$-1\r\n");
}

/// Array of bulk strings; `None` entries are sent as null bulks.
pub fn write_array(stream: &mut TcpStream, items: &[Option<&str>]) {
    let mut frame = format!("*{}\r\n", items.len());
    for item in items {
        match item {
            Some(data) => frame.push_str(&format!("${}\r\n{data}\r\n", data.len())),
            None => frame.push_str("$-1\r\n"),
        }
    }
    send(stream, frame.as_bytes());
}
