/*
 * Responsibility
 * - 外部サービスクライアントの公開インターフェース (re-export)
 */
pub mod hero;
