pub mod order;

pub use order::{NewOrder, Order, OrderItem, OrderStatus, PostgresOrderRepository};
