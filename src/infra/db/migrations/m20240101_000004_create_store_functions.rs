//! Migration: Install the server-side order and authentication routines.
//!
//! PostgreSQL only. Other backends run the equivalent steps in the
//! repositories.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Creates an order with all its items. Raises `product_not_found: <id>` or
/// `insufficient_stock: <id>` and applies nothing on failure.
const CREATE_ORDER: &str = r#"
CREATE OR REPLACE FUNCTION create_order(p_user_id INT, p_items JSON)
RETURNS INT AS $$
DECLARE
    v_order_id INT;
    v_total NUMERIC(12, 2) := 0;
    v_item JSON;
    v_product_id INT;
    v_quantity INT;
    v_stock INT;
BEGIN
    IF json_array_length(p_items) = 0 THEN
        RAISE EXCEPTION 'order_empty';
    END IF;

    FOR v_item IN SELECT * FROM json_array_elements(p_items) LOOP
        v_product_id := (v_item->>'product_id')::INT;
        v_quantity := (v_item->>'quantity')::INT;

        SELECT stock INTO v_stock FROM products WHERE id = v_product_id FOR UPDATE;
        IF NOT FOUND THEN
            RAISE EXCEPTION 'product_not_found: %', v_product_id;
        END IF;
        IF v_stock < v_quantity THEN
            RAISE EXCEPTION 'insufficient_stock: %', v_product_id;
        END IF;

        UPDATE products
        SET stock = stock - v_quantity, updated_at = NOW()
        WHERE id = v_product_id;

        v_total := v_total + v_quantity * (v_item->>'unit_price')::NUMERIC;
    END LOOP;

    INSERT INTO orders (user_id, total, created_at, updated_at)
    VALUES (p_user_id, v_total, NOW(), NOW())
    RETURNING id INTO v_order_id;

    INSERT INTO order_items (order_id, product_id, quantity, unit_price, created_at, updated_at)
    SELECT v_order_id,
           (e->>'product_id')::INT,
           (e->>'quantity')::INT,
           (e->>'unit_price')::NUMERIC,
           NOW(),
           NOW()
    FROM json_array_elements(p_items) AS e;

    RETURN v_order_id;
END;
$$ LANGUAGE plpgsql;
"#;

const AUTH_USER: &str = r#"
CREATE OR REPLACE FUNCTION auth_user(p_username TEXT, p_password_hash TEXT)
RETURNS TABLE (user_id INT, role_name TEXT) AS $$
BEGIN
    RETURN QUERY
    SELECT u.id, r.name::TEXT
    FROM users u
    INNER JOIN roles r ON r.id = u.role_id
    WHERE u.username = p_username AND u.password_hash = p_password_hash;
END;
$$ LANGUAGE plpgsql;
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        db.execute_unprepared(CREATE_ORDER).await?;
        db.execute_unprepared(AUTH_USER).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        db.execute_unprepared("DROP FUNCTION IF EXISTS auth_user(TEXT, TEXT)")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS create_order(INT, JSON)")
            .await?;
        Ok(())
    }
}
