use crate::api::{FetchGateway, HttpTransport};
use crate::commands::{self, Action};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::sync::ReviewSession;
use crate::ui;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What to print after the next state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
  Transactions,
  Employees,
}

/// Main application state
pub struct App {
  session: ReviewSession,

  /// View redrawn when fetch results arrive
  view: View,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let transport = HttpTransport::new(&config.api)?;
    let gateway = FetchGateway::new(Arc::new(transport));

    Ok(Self {
      session: ReviewSession::new(gateway, config.approvals.on_confirm_failure),
      view: View::Transactions,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));

    print!("{}", ui::render_help(""));

    // Initial data load
    self.load_initial_data();

    // Main loop
    while !self.should_quit {
      match events.next().await {
        Some(Event::Line(line)) => self.handle_line(&line),
        Some(Event::Tick) => {
          if self.session.poll() {
            debug!(stage = ?self.session.reload_stage(), "Session updated");
            self.draw();
          }
        }
        Some(Event::Closed) | None => {
          // Deliver pending approvals before leaving
          self.session.settle().await;
          self.draw();
          self.should_quit = true;
        }
      }
    }

    info!(
      pending_confirmations = self.session.confirmations_in_flight(),
      "Session ended"
    );
    Ok(())
  }

  fn load_initial_data(&mut self) {
    if self.session.employees().is_none() && !self.session.employees_loading() {
      self.session.load_all();
    }
  }

  fn handle_line(&mut self, line: &str) {
    match commands::parse(line) {
      Ok(action) => self.execute(action),
      Err(message) => println!("{}", message),
    }
  }

  fn execute(&mut self, action: Action) {
    match action {
      Action::List => {
        self.view = View::Transactions;
        self.draw();
      }
      Action::Employees => {
        self.view = View::Employees;
        self.draw();
      }
      Action::Filter(None) => {
        self.view = View::Transactions;
        self.session.on_employee_filter_change(None);
        self.draw();
      }
      Action::Filter(Some(id)) => {
        let Some(employee) = self.session.employee(&id).cloned() else {
          println!("Unknown employee '{}'. Type 'employees' for choices.", id);
          return;
        };
        self.view = View::Transactions;
        self.session.on_employee_filter_change(Some(&employee));
        self.draw();
      }
      Action::More => {
        self.view = View::Transactions;
        if !self.session.on_request_more_pages() {
          println!("No more transactions to load.");
        }
      }
      Action::Approval {
        transaction_id,
        value,
      } => {
        let known = self
          .session
          .transactions()
          .is_some_and(|list| list.iter().any(|t| t.id == transaction_id));
        if !known {
          println!("Transaction '{}' is not in the current list.", transaction_id);
          return;
        }
        self.session.on_transaction_approval(&transaction_id, value);
        self.view = View::Transactions;
        self.draw();
      }
      Action::Refresh => {
        self.session.refresh();
        self.draw();
      }
      Action::Help(filter) => print!("{}", ui::render_help(&filter)),
      Action::Quit => self.should_quit = true,
    }
  }

  fn draw(&self) {
    let output = match self.view {
      View::Transactions => ui::render_transactions(&self.session),
      View::Employees => ui::render_employees(&self.session),
    };
    println!("{}", output);
  }
}
