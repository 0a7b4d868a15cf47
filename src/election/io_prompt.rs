// Ballots typed in by the operator, one rank at a time.

use std::io::{BufRead, Write};

use crate::election::*;

fn read_line<R: BufRead>(input: &mut R) -> TidemanResult<String> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context(ReadingInputSnafu {})?;
    ensure!(n > 0, UnexpectedEndOfInputSnafu {});
    Ok(line.trim().to_string())
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> TidemanResult<String> {
    write!(output, "{}", prompt).context(WritingPromptSnafu {})?;
    output.flush().context(WritingPromptSnafu {})?;
    read_line(input)
}

/// Asks for the number of voters until a number is entered.
fn ask_num_voters<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> TidemanResult<u64> {
    loop {
        let line = ask(input, output, "Number of voters: ")?;
        match line.parse::<u64>() {
            Ok(n) => return Ok(n),
            Err(_) => debug!("ask_num_voters: not a number: {:?}", line),
        }
    }
}

/// Reads all the ballots from the prompt into the builder.
///
/// Each voter is asked for one name per rank. An unknown name ends the
/// ballot early, and the builder decides whether to skip it or to stop.
pub fn read_prompt_ballots<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    builder: &mut Builder,
) -> TidemanResult<()> {
    let num_candidates = match builder.registry() {
        Some(reg) => reg.len(),
        None => return Err(VotingErrors::MissingCandidates).context(VotingSnafu),
    };
    let num_voters = ask_num_voters(input, output)?;
    info!("read_prompt_ballots: {} voters", num_voters);

    for voter in 0..num_voters {
        let mut choices: Vec<String> = Vec::with_capacity(num_candidates);
        for rank in 1..=num_candidates {
            let name = ask(input, output, &format!("Rank {}: ", rank))?;
            let known = builder
                .registry()
                .map(|reg| reg.index_of(&name).is_some())
                .unwrap_or(false);
            choices.push(name);
            if !known {
                break;
            }
        }
        debug!("read_prompt_ballots: voter {}: {:?}", voter + 1, choices);
        if let Err(e) = builder.add_vote_simple(&choices) {
            writeln!(output, "Invalid vote.").context(WritingPromptSnafu {})?;
            return Err(e).context(VotingSnafu);
        }
        writeln!(output).context(WritingPromptSnafu {})?;
    }
    Ok(())
}
