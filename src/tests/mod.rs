mod test_trajectory;
