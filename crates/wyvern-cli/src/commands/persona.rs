//! Persona commands - browse the clan table.

use wyvern_ai::persona;

pub(crate) fn list() -> miette::Result<()> {
    println!("Clan members:");
    for member in persona::members() {
        let entry = persona::lookup(member);
        println!("  {:<10} {}", member, entry.role);
    }
    Ok(())
}

pub(crate) fn show(member: &str) -> miette::Result<()> {
    let entry = persona::lookup(member);

    if !persona::is_known(member) {
        println!("(no entry for '{}'; showing the generic persona)", member);
        println!();
    }
    println!("Role:        {}", entry.role);
    println!("Personality: {}", entry.personality);
    println!();
    println!("{}", entry.backstory);
    Ok(())
}

pub(crate) fn enhance(member: &str, prompt: &str) -> miette::Result<()> {
    println!("{}", wyvern_ai::enhance(prompt, member));
    Ok(())
}
