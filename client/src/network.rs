use crate::game::ClientGameState;
use log::{debug, info, warn};
use shared::{decode_line, ServerMessage};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

pub struct Client {
    server: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    game_state: ClientGameState,
}

impl Client {
    pub async fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Connecting to {}...", server_addr);
        let stream = TcpStream::connect(server_addr).await?;
        let (read_half, writer) = stream.into_split();

        Ok(Client {
            server: BufReader::new(read_half).lines(),
            writer,
            game_state: ClientGameState::new(),
        })
    }

    pub fn game_state(&self) -> &ClientGameState {
        &self.game_state
    }

    /// Plays using the terminal
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.play(stdin, std::io::stdout()).await
    }

    /// Main loop: prints every server message and forwards one input line
    /// each time the server asks for a reply. Input is only read while a
    /// reply is expected, so anything typed early waits for the next prompt.
    pub async fn play<I, W>(
        &mut self,
        input: I,
        mut output: W,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        I: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut input = input.lines();

        while !self.game_state.is_finished() {
            tokio::select! {
                line = self.server.next_line() => {
                    match line? {
                        Some(line) => self.handle_line(&line, &mut output)?,
                        None => {
                            warn!("Server closed the connection");
                            break;
                        }
                    }
                },

                reply = input.next_line(), if self.game_state.awaiting_reply() => {
                    match reply? {
                        Some(reply) => self.send_reply(&reply).await?,
                        None => {
                            info!("Input closed, leaving the game");
                            break;
                        }
                    }
                },
            }
        }

        let _ = self.writer.shutdown().await;
        Ok(())
    }

    fn handle_line<W: Write>(
        &mut self,
        line: &str,
        output: &mut W,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let message = match decode_line(line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring unreadable line from server: {}", e);
                return Ok(());
            }
        };
        debug!("Received {:?}", message);

        self.game_state.apply(&message);
        if let ServerMessage::YourTurn { .. } = message {
            if let Some(status) = self.game_state.status_line() {
                writeln!(output, "{}", status)?;
            }
        }
        if message.expects_reply() {
            write!(output, "{}", message)?;
            output.flush()?;
        } else {
            writeln!(output, "{}", message)?;
        }

        if let ServerMessage::GameEnding = message {
            writeln!(output, "Disconnected from the server.")?;
        }
        Ok(())
    }

    async fn send_reply(&mut self, reply: &str) -> Result<(), Box<dyn std::error::Error>> {
        let reply = reply.trim();
        self.writer.write_all(reply.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.game_state.replied();
        Ok(())
    }
}
