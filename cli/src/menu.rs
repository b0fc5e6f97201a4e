use std::io::{BufRead, Write};

use anyhow::Result;
use itertools::Itertools;
use socialnet::{SocialNetwork, User, UserId, UserStore};

const MENU: &str = "
=== Social Network Menu ===
1. Add user
2. Remove user
3. Add friendship
4. Remove friendship
5. Show number of communities
6. Show most sociable community
7. Exit
8. Show friendships
0. Show all users
Choose an option: ";

enum Flow {
    Continue,
    Exit,
}

/// Line-based interactive front end over a [SocialNetwork].
///
/// Errors reported by the network are printed and the loop continues; I/O errors end it.
pub struct Menu<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the exit option is chosen or input ends.
    pub fn run<S: UserStore>(&mut self, network: &mut SocialNetwork<S>) -> Result<()> {
        loop {
            write!(self.output, "{}", MENU)?;
            self.output.flush()?;
            let Some(option) = self.read_line()? else {
                break;
            };
            match self.handle(option.trim(), network) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) => match err.downcast_ref::<socialnet::Error>() {
                    Some(err) => writeln!(self.output, "Error: {}", err)?,
                    None => return Err(err),
                },
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    fn handle<S: UserStore>(
        &mut self,
        option: &str,
        network: &mut SocialNetwork<S>,
    ) -> Result<Flow> {
        match option {
            "0" => self.show_users(network)?,
            "1" => {
                let id = self.prompt("Enter user ID: ")?;
                let first_name = self.prompt("Enter first name: ")?;
                let last_name = self.prompt("Enter last name: ")?;
                network.add_user(User::new(id, first_name, last_name))?;
                writeln!(self.output, "User added successfully!")?;
            }
            "2" => {
                let id = UserId::from(self.prompt("Enter user ID to remove: ")?);
                match network.remove_user(&id)? {
                    Some(_) => writeln!(self.output, "User removed successfully!")?,
                    None => writeln!(self.output, "No user with ID '{}'.", id)?,
                }
            }
            "3" => {
                let (a, b) = self.prompt_pair()?;
                network.add_friendship(&a, &b)?;
                writeln!(self.output, "Friendship added successfully!")?;
            }
            "4" => {
                let (a, b) = self.prompt_pair()?;
                network.remove_friendship(&a, &b)?;
                writeln!(self.output, "Friendship removed successfully!")?;
            }
            "5" => writeln!(
                self.output,
                "Number of communities: {}",
                network.number_of_communities()
            )?,
            "6" => {
                let community = network.most_sociable_community();
                if community.is_empty() {
                    writeln!(self.output, "No community has more than one member.")?;
                } else {
                    writeln!(self.output, "Most sociable community members:")?;
                    for user in community {
                        writeln!(self.output, "{}", user)?;
                    }
                }
            }
            "7" => return Ok(Flow::Exit),
            "8" => {
                let friendships = network.friendships();
                if friendships.is_empty() {
                    writeln!(self.output, "No friendships.")?;
                } else {
                    writeln!(self.output, "{}", friendships.iter().join("\n"))?;
                }
            }
            _ => writeln!(self.output, "Invalid option!")?,
        }
        Ok(Flow::Continue)
    }

    fn show_users<S: UserStore>(&mut self, network: &SocialNetwork<S>) -> Result<()> {
        for user in network.all_users() {
            let friends = user.friends().iter().join(", ");
            writeln!(self.output, "{} [friends: {}]", user, friends)?;
        }
        Ok(())
    }

    fn prompt_pair(&mut self) -> Result<(UserId, UserId)> {
        let a = self.prompt("Enter first user ID: ")?;
        let b = self.prompt("Enter second user ID: ")?;
        Ok((UserId::from(a), UserId::from(b)))
    }

    /// End of input reads as an empty answer.
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}
