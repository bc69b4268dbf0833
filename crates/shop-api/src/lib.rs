//! # shop-api
//!
//! HTTP API layer for the artisan storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - MongoDB store, SMTP notifier, identity-provider client and disk uploads
//! - Session cookie authentication for admin routes
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/` | Health check |
//! | POST | `/api/auth/session` | Log in with an identity-provider session id |
//! | GET | `/api/auth/me` | Current user |
//! | POST | `/api/auth/logout` | Log out |
//! | GET, POST | `/api/products` | List / create products |
//! | GET, PUT, DELETE | `/api/products/{id}` | Read / replace / delete a product |
//! | GET | `/api/products/slug/{slug}` | Product by slug |
//! | POST | `/api/products/{id}/upload` | Attach images |
//! | POST | `/api/orders` | Checkout |
//! | GET | `/api/orders/{order_number}` | Track an order |
//! | GET | `/api/admin/orders` | All orders |
//! | PUT | `/api/admin/orders/{id}/status` | Update fulfilment status |
//! | POST | `/api/payment/create-order` | Create a Razorpay order |
//! | POST | `/api/payment/verify` | Verify a Razorpay payment |
//! | GET | `/uploads/*` | Product images |

pub mod auth;
pub mod handlers;
pub mod identity;
pub mod mailer;
pub mod mongo;
pub mod routes;
pub mod state;
pub mod uploads;

pub use mongo::MongoStore;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
