use std::io::{self, BufRead, Write};

use client::{parse, ApiClient, Command};

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn format_rating(rating: Option<i32>) -> String {
    match rating {
        Some(value) => value.to_string(),
        None => "not yet rated".to_owned(),
    }
}

async fn run(client: &mut ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { url } => {
            let username = prompt("Please enter your username: ")?;
            let password = prompt("Please enter your password: ")?;
            match client.login(&url, &username, &password).await {
                Ok(()) => println!("Login successful"),
                Err(err) => println!("{err}"),
            }
        }
        Command::Logout => match client.logout().await {
            Ok(()) => println!("Logout successful"),
            Err(err) => println!("{err}"),
        },
        Command::List => match client.list_module_instances().await {
            Ok(instances) => {
                for instance in instances {
                    let taught_by = instance
                        .taught_by
                        .iter()
                        .map(|p| format!("{}, {}", p.professor_code, p.professor_name))
                        .collect::<Vec<_>>()
                        .join("; ");
                    println!(
                        "{} {} (year {}, semester {}) taught by: {}",
                        instance.module_code,
                        instance.module_name,
                        instance.academic_year,
                        instance.semester,
                        taught_by
                    );
                }
            }
            Err(err) => println!("{err}"),
        },
        Command::View => match client.all_professor_ratings().await {
            Ok(rows) => {
                for row in rows {
                    println!(
                        "The rating of {} ({}) is {}",
                        row.name,
                        row.professor_code,
                        format_rating(row.rating)
                    );
                }
            }
            Err(err) => println!("{err}"),
        },
        Command::Average {
            professor_code,
            module_code,
        } => match client
            .professor_module_rating(&professor_code, &module_code)
            .await
        {
            Ok(rows) => {
                for row in rows {
                    println!(
                        "The rating of {} ({}) in module {} ({}) is {}",
                        row.professor_name,
                        row.professor_code,
                        row.module_name,
                        row.module_code,
                        format_rating(row.rating)
                    );
                }
            }
            Err(err) => println!("{err}"),
        },
        Command::Rate {
            professor_code,
            module_code,
            year,
            semester,
            rating,
        } => match client
            .rate(&professor_code, &module_code, &year, &semester, &rating)
            .await
        {
            Ok(message) => println!("{message}"),
            Err(err) => println!("{err}"),
        },
        Command::Register => {
            let username = prompt("Please enter a username: ")?;
            let email = prompt("Please enter an email address: ")?;
            let password = prompt("Please enter a password: ")?;
            match client.register(&username, &email, &password).await {
                Ok(message) => println!("{message}"),
                Err(err) => println!("{err}"),
            }
        }
        Command::Exit => unreachable!("exit is handled by the loop"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut client = ApiClient::new();
    loop {
        let line = prompt("Please enter a command: ")?;
        match parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Exit)) => break,
            Ok(Some(command)) => run(&mut client, command).await?,
            Err(usage) => println!("{usage}"),
        }
    }
    Ok(())
}
