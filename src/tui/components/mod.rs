//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields:
//! - `TitleBar`: Agent name, status, and the "↓ New" hint
//! - `Message`: One chat bubble with its option buttons
//! - `RestartBar`: The restart button
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: Text input that locks while the conversation waits
//! - `MessageList`: Scrollable transcript with layout caching
//!
//! Each component file holds its state types, event types, rendering, event
//! handling, and tests.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message.rs       (Single bubble renderer)
//! ├── message_list.rs  (Scrollable transcript)
//! ├── restart_bar.rs   (Restart control)
//! └── input_box.rs     (Text input)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub use input_box::{InputBox, InputEvent};
pub mod message;
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
mod restart_bar;
pub use restart_bar::RestartBar;
