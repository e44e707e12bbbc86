use serde::{Serialize, de::DeserializeOwned};
use std::{
    io::{self, Read, Write},
    net::{IpAddr, Ipv4Addr, UdpSocket},
};

/// Cap on a single frame. Action records are tiny; a length prefix anywhere
/// near this is a corrupt or hostile frame.
const MAX_FRAME_SIZE: usize = 64 * 1024;

pub fn read_prefixed<T: DeserializeOwned, R: Read>(reader: &mut R) -> io::Result<T> {
    // Read the size as a u32
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds the {MAX_FRAME_SIZE} byte cap"),
        ));
    }

    // read_exact reassembles the record across partial reads, so a decode
    // never consumes part of a frame.
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;
    serde_json::from_slice(&buf).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

pub fn write_prefixed<T: Serialize, W: Write>(writer: &mut W, value: &T) -> io::Result<()> {
    let serialized =
        serde_json::to_vec(value).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    if serialized.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "record of {} bytes exceeds the {MAX_FRAME_SIZE} byte cap",
                serialized.len()
            ),
        ));
    }

    // Write the size of the record and the record itself all in one chunk
    // to prevent read-side EOF race conditions.
    let size = serialized.len() as u32;
    let mut buf = Vec::from(size.to_le_bytes());
    buf.extend(serialized);
    writer.write_all(&buf)
}

/// Best-effort local outbound address. Connecting a UDP socket sends no
/// packets but makes the OS pick the outbound interface; falls back to
/// loopback. Advisory only, never part of the protocol.
#[must_use]
pub fn local_ip() -> IpAddr {
    let looked_up = UdpSocket::bind(("0.0.0.0", 0)).and_then(|socket| {
        socket.connect(("8.8.8.8", 80))?;
        socket.local_addr()
    });
    match looked_up {
        Ok(addr) => addr.ip(),
        Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        net::{TcpListener, TcpStream},
    };

    use super::{local_ip, read_prefixed, write_prefixed};
    use crate::game::entities::Seat;
    use crate::net::messages::Action;

    fn setup() -> (TcpStream, TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = server.accept().unwrap();
        (client, stream)
    }

    #[test]
    fn write_and_read() {
        let (mut client, mut stream) = setup();
        let action = Action::Bet {
            player: Seat::One,
            amount: 100,
        };
        assert!(write_prefixed(&mut stream, &action).is_ok());
        assert!(read_prefixed::<Action, TcpStream>(&mut client).is_ok_and(|a| a == action));
    }

    #[test]
    fn write_and_read_multiple_messages_in_order() {
        let (mut client, mut stream) = setup();

        let actions = [
            Action::NewRound,
            Action::Bet {
                player: Seat::One,
                amount: 50,
            },
            Action::Bet {
                player: Seat::Two,
                amount: 75,
            },
            Action::Hit { player: Seat::One },
            Action::Stand { player: Seat::One },
        ];
        for action in &actions {
            assert!(write_prefixed(&mut stream, action).is_ok());
        }

        for action in &actions {
            let received: Action = read_prefixed(&mut client).unwrap();
            assert_eq!(received, *action);
        }
    }

    #[test]
    fn reject_oversized_frame() {
        let (mut client, mut stream) = setup();

        // A length prefix claiming 2GB. Must be rejected before any
        // allocation or payload read.
        let malicious_size = 2_000_000_000u32;
        assert!(stream.write_all(&malicious_size.to_le_bytes()).is_ok());

        assert_eq!(
            read_prefixed::<Action, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn garbage_payload_is_invalid_data() {
        let (mut client, mut stream) = setup();

        let garbage = b"}not json";
        assert!(stream.write_all(&(garbage.len() as u32).to_le_bytes()).is_ok());
        assert!(stream.write_all(garbage).is_ok());

        assert_eq!(
            read_prefixed::<Action, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn truncated_frame_is_unexpected_eof() {
        let (mut client, mut stream) = setup();

        // A full length prefix, part of the record, then a closed stream.
        assert!(stream.write_all(&100u32.to_le_bytes()).is_ok());
        assert!(stream.write_all(b"{\"type\":").is_ok());
        drop(stream);

        assert_eq!(
            read_prefixed::<Action, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn partial_length_prefix_is_unexpected_eof() {
        let (mut client, mut stream) = setup();

        // Only 2 bytes of the 4-byte length prefix.
        assert!(stream.write_all(&[0, 0]).is_ok());
        drop(stream);

        assert_eq!(
            read_prefixed::<Action, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn peer_close_is_unexpected_eof() {
        let (mut client, stream) = setup();
        drop(stream);
        assert_eq!(
            read_prefixed::<Action, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn local_ip_never_unspecified() {
        // Either the real outbound interface or the loopback fallback.
        assert!(!local_ip().is_unspecified());
    }
}
