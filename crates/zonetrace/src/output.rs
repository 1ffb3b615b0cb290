//! Terminal output.
//!
//! Builds the tracer that prints each hop as it completes, and formats
//! the final answer. Errors go red, progress notes blue, unresolved name
//! servers yellow; everything routes through `console` so styling drops
//! out on non-terminals.

use console::style;
use std::time::Duration;
use zonetrace_client::{Responses, Tracer};
use zonetrace_proto::{Message, Name, RecordClass, RecordType};

/// Builds the tracer printing per-hop progress, or a silent one.
pub fn tracer(quiet: bool) -> Tracer {
    if quiet {
        return Tracer::silent();
    }
    Tracer {
        on_response: Some(Box::new(print_step)),
        on_cname: Some(Box::new(print_cname)),
    }
}

fn print_step(step: u32, query: Message, responses: &Responses, _kind: zonetrace_client::ResponseKind) {
    let question = match query.question() {
        Some(q) => q,
        None => return,
    };
    println!(
        "{}",
        style(format!(
            ";; step {step}: {} {} {}",
            question.qname,
            RecordClass::display_code(question.qclass),
            RecordType::display_code(question.qtype),
        ))
        .cyan()
    );

    // Fastest first, failures last; the tool exists for this table.
    let mut ordered: Vec<_> = responses.iter().collect();
    ordered.sort_by_key(|r| (r.err.is_some(), r.cold_rtt()));

    for response in &ordered {
        match &response.err {
            Some(err) => {
                println!(
                    "{}",
                    style(format!(
                        "*** {}({}): {err}",
                        response.server.name, response.addr
                    ))
                    .red()
                );
            }
            None => {
                let lookup = if response.server.lookup_rtt > Duration::ZERO {
                    format!(" (+{}ms lookup)", response.server.lookup_rtt.as_millis())
                } else {
                    String::new()
                };
                println!(
                    "   {}({}) {}ms{lookup}",
                    response.server.name,
                    response.addr,
                    response.rtt.as_millis(),
                );
            }
        }
    }

    if let Some(fastest) = responses.fastest() {
        if let Some(msg) = &fastest.msg {
            for rr in msg.answers().iter().chain(msg.authority()) {
                println!("{rr}");
            }
            for orphan in unglued_servers(msg) {
                println!(
                    "{}",
                    style(format!(";; no glue found for {orphan}")).yellow()
                );
            }
            println!(
                "{}",
                style(format!(
                    ";; received {} bytes from {}({}) in {}ms\n",
                    msg.wire_len(),
                    fastest.server.name,
                    fastest.addr,
                    fastest.rtt.as_millis(),
                ))
                .blue()
            );
        }
    }
}

/// Name server targets of a referral that arrived without any glue.
fn unglued_servers(msg: &Message) -> Vec<&Name> {
    msg.authority()
        .iter()
        .filter_map(|rr| rr.rdata.as_ns())
        .filter(|target| {
            !msg.additional()
                .iter()
                .any(|extra| &extra.name == *target && extra.rdata.as_ip().is_some())
        })
        .collect()
}

fn print_cname(owner: &Name, target: &Name) {
    println!(
        "{}",
        style(format!(";; following CNAME {owner} -> {target}")).blue()
    );
}

/// Prints the terminal answer and the accumulated cold-path time.
pub fn print_answer(answer: &Message, rtt: Duration) {
    println!("{}", style(";; final answer:").green().bold());
    println!(";; status: {}", answer.rcode());
    for rr in answer.answers() {
        println!("{rr}");
    }
    if answer.answers().is_empty() {
        for rr in answer.authority() {
            println!("{rr}");
        }
    }
    println!(
        "{}",
        style(format!(";; cold best path: {}ms", rtt.as_millis())).blue()
    );
}

/// Prints the give-up notice when the iteration budget ran out.
pub fn print_exhausted(rtt: Duration) {
    eprintln!(
        "{}",
        style(format!(
            ";; gave up without an answer after {}ms of cold path",
            rtt.as_millis()
        ))
        .yellow()
        .bold()
    );
}
