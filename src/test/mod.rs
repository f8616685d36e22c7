mod mac_queue;
mod service_flow;
mod sim_time;
mod traffic_gen;
